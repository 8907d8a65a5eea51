//! Integration tests for the MdShelf session interface.
//!
//! These tests drive whole operations end to end against temporary folders and,
//! for remote images, a local HTTP server.

use axum::http::header;
use axum::routing::get;
use axum::Router;
use mdshelf_core::{MdShelf, MdShelfError, MigrationConfig, Operation, RenamePattern};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn shelf() -> MdShelf {
    MdShelf::new().expect("Failed to create session")
}

/// Serve a couple of images on an ephemeral port and return the base URL.
async fn spawn_image_server() -> String {
    let app = Router::new()
        .route(
            "/pics/cat.png",
            get(|| async { ([(header::CONTENT_TYPE, "image/png")], b"cat-bytes".to_vec()) }),
        )
        .route(
            "/render",
            get(|| async { ([(header::CONTENT_TYPE, "image/svg+xml")], "<svg/>") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_single_file_migration_with_subfolders() {
    let tmp = TempDir::new().unwrap();
    let doc = tmp.path().join("src/doc.md");
    write(&doc, "# Doc\n\n![x](img/photo.png)\n");
    write(&tmp.path().join("src/img/photo.png"), "png");
    let out = tmp.path().join("out");

    let config = MigrationConfig {
        use_subfolders: true,
        ..Default::default()
    };
    let result = shelf().migrate(&doc, &out, &config).await.unwrap();

    assert!(result.success);
    assert_eq!(result.processed, 1);
    assert_eq!(
        fs::read_to_string(out.join("doc.md")).unwrap(),
        "# Doc\n\n![x](./images/doc/photo.png)\n"
    );
    assert!(out.join("images/doc/photo.png").is_file());
    // source is left untouched
    assert!(tmp.path().join("src/img/photo.png").is_file());

    let log_file = result.log_file.expect("run log should be written");
    let log = fs::read_to_string(log_file).unwrap();
    assert!(log.contains("[INFO] Copied"));
}

#[tokio::test]
async fn test_plain_links_rewritten_with_images() {
    let tmp = TempDir::new().unwrap();
    let doc = tmp.path().join("src/doc.md");
    write(&doc, "![x](img/photo.png)\n[full size](img/photo.png)\n");
    write(&tmp.path().join("src/img/photo.png"), "png");
    let out = tmp.path().join("out");

    let config = MigrationConfig {
        use_subfolders: true,
        write_run_log: false,
        ..Default::default()
    };
    shelf().migrate(&doc, &out, &config).await.unwrap();

    let text = fs::read_to_string(out.join("doc.md")).unwrap();
    assert_eq!(
        text,
        "![x](./images/doc/photo.png)\n[full size](./images/doc/photo.png)\n"
    );
    assert!(!text.contains("](img/photo.png)"));
}

#[tokio::test]
async fn test_directory_migration_with_merge() {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    write(&src.join("a.md"), "A");
    write(&src.join("b.md"), "B");
    let out = tmp.path().join("out");

    let config = MigrationConfig {
        merge: true,
        write_run_log: false,
        ..Default::default()
    };
    let result = shelf().migrate(&src, &out, &config).await.unwrap();

    assert_eq!(result.processed, 2);
    assert!(result.log_file.is_none());
    let merged = result.merged_output.unwrap();
    assert!(merged.ends_with("merged_document.md"));
    assert_eq!(
        fs::read_to_string(merged).unwrap(),
        "\n\n# a.md\n\nA\n\n# b.md\n\nB"
    );
    assert!(!out.join("a.md").exists());
}

#[tokio::test]
async fn test_merge_output_is_not_an_input() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("a.md"), "A");
    write(&tmp.path().join("merged_document.md"), "old merge");

    let config = MigrationConfig {
        merge: true,
        write_run_log: false,
        ..Default::default()
    };
    let result = shelf().migrate(tmp.path(), tmp.path(), &config).await.unwrap();

    assert_eq!(result.processed, 1);
    assert_eq!(
        fs::read_to_string(tmp.path().join("merged_document.md")).unwrap(),
        "\n\n# a.md\n\nA"
    );
}

#[tokio::test]
async fn test_migration_without_documents_fails() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("notes.txt"), "nothing");

    let err = shelf()
        .migrate(tmp.path(), &tmp.path().join("out"), &MigrationConfig::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MdShelfError::NoMarkdownFiles(_)));
}

#[tokio::test]
async fn test_missing_single_document_fails() {
    let tmp = TempDir::new().unwrap();
    let err = shelf()
        .migrate(
            &tmp.path().join("gone.md"),
            &tmp.path().join("out"),
            &MigrationConfig::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MdShelfError::DocumentNotFound(_)));
}

#[tokio::test]
async fn test_remote_images_downloaded_from_server() {
    let base = spawn_image_server().await;
    let tmp = TempDir::new().unwrap();
    let doc = tmp.path().join("doc.md");
    write(
        &doc,
        &format!(
            "![c]({base}/pics/cat.png) ![r]({base}/render) ![m]({base}/missing.png)"
        ),
    );
    let out = tmp.path().join("out");

    let config = MigrationConfig {
        download_remote: true,
        write_run_log: false,
        ..Default::default()
    };
    let result = shelf().migrate(&doc, &out, &config).await.unwrap();

    assert_eq!(fs::read(out.join("images/cat.png")).unwrap(), b"cat-bytes");
    let text = fs::read_to_string(out.join("doc.md")).unwrap();
    assert!(text.starts_with("![c](./images/cat.png) ![r](./images/remote_image_"));
    assert!(text.contains(".svg)"));
    // the 404 leaves its link alone
    assert!(text.ends_with(&format!("![m]({base}/missing.png)")));
    assert_eq!(result.documents[0].relocated_count(), 2);

    let leftovers: Vec<_> = fs::read_dir(out.join("images"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".part"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_cleanup_after_reports_unused() {
    let tmp = TempDir::new().unwrap();
    let doc = tmp.path().join("src/doc.md");
    write(&doc, "![x](photo.png)");
    write(&tmp.path().join("src/photo.png"), "p");
    let out = tmp.path().join("out");
    write(&out.join("images/stale.png"), "s");
    write(&out.join("images/unused_backup/old.png"), "o");

    let config = MigrationConfig {
        cleanup_after: true,
        write_run_log: false,
        ..Default::default()
    };
    let result = shelf().migrate(&doc, &out, &config).await.unwrap();

    assert_eq!(result.unused, vec![out.join("images/stale.png")]);
}

#[tokio::test]
async fn test_audit_and_cleanup() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("doc.md"), "![p](images/photo.png)");
    write(&tmp.path().join("images/photo.png"), "p");
    write(&tmp.path().join("images/orphan.png"), "o");
    let shelf = shelf();

    let first = shelf.audit(tmp.path()).await.unwrap();
    let second = shelf.audit(tmp.path()).await.unwrap();
    assert_eq!(first.report, second.report);
    assert_eq!(first.redundant_count, 1);
    assert!(first.report.redundant[0].ends_with("images/orphan.png"));

    let cleanup = shelf
        .cleanup(first.report.redundant.clone(), false)
        .await
        .unwrap();
    assert!(cleanup.success);
    assert_eq!(cleanup.removed, 1);
    assert!(tmp.path().join("images/unused_backup/orphan.png").is_file());

    let after = shelf.audit(tmp.path()).await.unwrap();
    assert_eq!(after.redundant_count, 0);
}

#[tokio::test]
async fn test_rename_apply_and_undo() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("a.md"), "A");
    write(&tmp.path().join("b.md"), "B");
    let shelf = shelf();
    let pattern = RenamePattern::parse("{original}_{num}", "1", "3").unwrap();

    assert!(!shelf.can_undo().await);
    let preview = shelf.rename_preview(tmp.path(), &pattern).await.unwrap();
    let names: Vec<_> = preview.entries.iter().map(|e| e.new_name.as_str()).collect();
    assert_eq!(names, vec!["a_001.md", "b_002.md"]);
    assert!(tmp.path().join("a.md").exists());

    let applied = shelf.rename_apply(tmp.path(), &pattern).await.unwrap();
    assert_eq!(applied.renamed.len(), 2);
    assert_eq!(applied.history_depth, 1);
    assert!(shelf.can_undo().await);
    assert_eq!(fs::read_to_string(tmp.path().join("b_002.md")).unwrap(), "B");

    let undo = shelf.rename_undo().await.unwrap();
    assert_eq!(undo.restored, 2);
    assert_eq!(undo.history_depth, 0);
    assert_eq!(fs::read_to_string(tmp.path().join("a.md")).unwrap(), "A");
    assert_eq!(fs::read_to_string(tmp.path().join("b.md")).unwrap(), "B");

    let err = shelf.rename_undo().await.unwrap_err();
    assert!(matches!(err, MdShelfError::NoHistory));
}

#[tokio::test]
async fn test_rename_collision_changes_nothing() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("a.md"), "A");
    write(&tmp.path().join("b.md"), "B");
    let shelf = shelf();
    let pattern = RenamePattern::new("fixed", 1, 0).unwrap();

    let err = shelf.rename_apply(tmp.path(), &pattern).await.unwrap_err();
    assert!(matches!(err, MdShelfError::NameCollision { .. }));
    assert!(err.is_fatal_precondition());
    assert!(!shelf.can_undo().await);
    assert!(tmp.path().join("a.md").exists());
}

#[tokio::test]
async fn test_inplace_reorganize() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("note.md"), "![](shots/a.png) ![](./images/kept.png)");
    write(&tmp.path().join("shots/a.png"), "a");
    write(&tmp.path().join("images/kept.png"), "k");
    write(&tmp.path().join("images/stray.png"), "s");

    let result = shelf().inplace(tmp.path(), true).await.unwrap();

    assert_eq!(result.processed, 1);
    assert_eq!(result.moved_count, 1);
    assert_eq!(
        fs::read_to_string(tmp.path().join("note.md")).unwrap(),
        "![](./images/note_1.png) ![](./images/kept.png)"
    );
    assert_eq!(result.unused, vec![tmp.path().join("images/stray.png")]);
}

#[tokio::test]
async fn test_inplace_requires_documents() {
    let tmp = TempDir::new().unwrap();
    let err = shelf().inplace(tmp.path(), false).await.unwrap_err();
    assert!(matches!(err, MdShelfError::NoMarkdownFiles(_)));
}

#[tokio::test]
async fn test_progress_events_per_document() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("src/a.md"), "A");
    write(&tmp.path().join("src/b.md"), "B");
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let shelf = MdShelf::builder().with_progress(tx).build().unwrap();

    let config = MigrationConfig {
        write_run_log: false,
        ..Default::default()
    };
    shelf
        .migrate(&tmp.path().join("src"), &tmp.path().join("out"), &config)
        .await
        .unwrap();

    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert_eq!(first.operation, Operation::Migrate);
    assert_eq!((first.current, first.total), (1, 2));
    assert_eq!((second.current, second.total), (2, 2));
    assert_eq!(shelf.in_flight(), 0);
}
