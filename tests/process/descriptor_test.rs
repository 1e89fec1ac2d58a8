/*!
 * Descriptor table property tests
 */

use proptest::prelude::*;
use std::collections::BTreeSet;
use userprog_kernel::process::{DescriptorError, DescriptorTable};
use userprog_kernel::{FileSystem, MemFs};

#[derive(Debug, Clone)]
enum Op {
    Open,
    OpenMissing,
    Close(u32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Open),
        1 => Just(Op::OpenMissing),
        3 => (0u32..12).prop_map(Op::Close),
    ]
}

fn smallest_free(open: &BTreeSet<u32>) -> u32 {
    (2..).find(|fd| !open.contains(fd)).unwrap_or(2)
}

proptest! {
    #[test]
    fn prop_open_takes_smallest_free_descriptor(ops in prop::collection::vec(op(), 1..60)) {
        let fs = MemFs::new();
        fs.create("file", 0).unwrap();
        let mut table = DescriptorTable::new(usize::MAX);
        let mut model = BTreeSet::new();

        for op in ops {
            match op {
                Op::Open => {
                    let expected = smallest_free(&model);
                    let fd = table.open(&fs, "file").unwrap();
                    prop_assert_eq!(fd, expected);
                    prop_assert!(model.insert(fd));
                }
                Op::OpenMissing => {
                    let before = table.len();
                    prop_assert!(matches!(table.open(&fs, "missing"), Err(DescriptorError::Open(_))));
                    prop_assert_eq!(table.len(), before);
                }
                Op::Close(fd) => {
                    prop_assert_eq!(table.close(fd), model.remove(&fd));
                }
            }
            prop_assert_eq!(table.descriptors(), model.iter().copied().collect::<Vec<_>>());
        }
    }
}

#[test]
fn test_close_all_resets_allocation() {
    let fs = MemFs::new();
    fs.put("a", b"abc").unwrap();
    let mut table = DescriptorTable::new(8);
    for _ in 0..3 {
        table.open(&fs, "a").unwrap();
    }
    assert_eq!(table.close_all(), 3);
    assert!(table.is_empty());
    assert_eq!(table.open(&fs, "a").unwrap(), 2);
}

#[test]
fn test_unknown_descriptor_errors() {
    let mut table = DescriptorTable::new(8);
    let mut buf = [0u8; 4];
    assert_eq!(table.read(5, &mut buf), Err(DescriptorError::NotOpen(5)));
    assert_eq!(table.tell(5), Err(DescriptorError::NotOpen(5)));
    assert_eq!(table.file_size(0), Err(DescriptorError::NotOpen(0)));
    assert!(!table.close(1));
}
