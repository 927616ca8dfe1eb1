use refassist_core::workspace::Workspace;
use refassist_infrastructure::{DirectoryWorkspace, WorkspaceSnapshot};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn directory_without_visible_files_is_empty() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir(temp_dir.path().join(".git")).unwrap();
    fs::create_dir(temp_dir.path().join("target")).unwrap();

    assert!(DirectoryWorkspace::new(temp_dir.path()).is_empty().await);
    assert!(
        DirectoryWorkspace::new(temp_dir.path().join("missing"))
            .is_empty()
            .await
    );
}

#[tokio::test]
async fn snapshot_lists_files_with_relative_paths() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("src/orders")).unwrap();
    fs::create_dir_all(temp_dir.path().join("target/debug")).unwrap();
    fs::write(temp_dir.path().join("README.md"), "monolith").unwrap();
    fs::write(temp_dir.path().join("src/orders/service.rs"), "fn main() {}").unwrap();
    fs::write(temp_dir.path().join("target/debug/app"), "binary").unwrap();
    fs::write(temp_dir.path().join(".env"), "SECRET=1").unwrap();

    let workspace = DirectoryWorkspace::new(temp_dir.path());
    assert!(!workspace.is_empty().await);

    let bytes = workspace.snapshot().await.unwrap();
    let snapshot: WorkspaceSnapshot = serde_json::from_slice(&bytes).unwrap();

    let paths: Vec<&str> = snapshot.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["README.md", "src/orders/service.rs"]);
    assert_eq!(snapshot.files[1].decoded().unwrap(), b"fn main() {}");
    assert_eq!(snapshot.files[0].size, 8);
}

#[tokio::test]
async fn large_files_are_left_out() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("small.txt"), "ok").unwrap();
    fs::write(temp_dir.path().join("large.bin"), vec![0u8; 64]).unwrap();

    let snapshot = DirectoryWorkspace::new(temp_dir.path())
        .with_max_file_bytes(16)
        .collect()
        .await
        .unwrap();

    assert_eq!(snapshot.files.len(), 1);
    assert_eq!(snapshot.files[0].path, "small.txt");
}
