/*!
 * MemFs Tests
 * The in-memory filesystem seen through the FileSystem trait
 */

use pretty_assertions::assert_eq;
use std::io::{Read, Seek, SeekFrom, Write};
use std::sync::Arc;
use std::thread;
use userprog_kernel::vfs::{FileSystem, MemFs, VfsError};

#[test]
fn test_memfs_basic() {
    let fs: Arc<dyn FileSystem> = Arc::new(MemFs::new());

    fs.create("test", 0).unwrap();
    assert!(fs.exists("test"));
    assert!(!fs.exists("missing"));

    let mut file = fs.open("test").unwrap();
    file.write_all(b"hello").unwrap();
    assert_eq!(file.length(), 5);

    let mut again = fs.open("test").unwrap();
    let mut text = String::new();
    again.read_to_string(&mut text).unwrap();
    assert_eq!(text, "hello");

    fs.remove("test").unwrap();
    assert!(!fs.exists("test"));
    assert!(matches!(fs.remove("test"), Err(VfsError::NotFound(_))));
}

#[test]
fn test_capacity_limit() {
    let fs = MemFs::with_capacity(10);
    fs.create("small", 5).unwrap();
    assert_eq!(fs.create("large", 11), Err(VfsError::OutOfSpace));
    assert!(!fs.exists("large"));
    assert_eq!(fs.used_bytes(), 5);
}

#[test]
fn test_name_normalization() {
    let fs = MemFs::new();
    fs.create("notes", 0).unwrap();
    assert!(fs.exists("./notes"));
    assert_eq!(fs.create("/notes", 0), Err(VfsError::AlreadyExists("/notes".into())));
    assert!(matches!(
        fs.create("fifteen-chars!!", 0),
        Err(VfsError::NameTooLong { limit: 14, .. })
    ));
}

#[test]
fn test_concurrent_writers_share_one_file() {
    let fs = MemFs::new();
    fs.create("shared", 64).unwrap();

    let handles: Vec<_> = (0..4u8)
        .map(|i| {
            let fs = fs.clone();
            thread::spawn(move || {
                let mut file = fs.open("shared").unwrap();
                let mut block = [0u8; 16];
                file.seek(SeekFrom::Start(u64::from(i) * 16)).unwrap();
                block.fill(b'a' + i);
                file.write_all(&block).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let contents = fs.contents("shared").unwrap();
    assert_eq!(contents.len(), 64);
    for (i, block) in contents.chunks(16).enumerate() {
        assert!(block.iter().all(|&b| b == b'a' + i as u8));
    }
}
