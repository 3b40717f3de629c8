//! Tests for residency-tagged buffers.

use super::*;

#[test]
fn move_to_same_residency_is_noop() {
    let mut buf = Buffer::device(vec![1u32, 2, 3]);
    let before = buf.as_slice().as_ptr();
    buf.move_to(Residency::Device).unwrap();
    assert_eq!(buf.as_slice().as_ptr(), before);
    assert_eq!(buf.residency(), Residency::Device);
}

#[test]
fn move_to_other_residency_copies() {
    let mut buf = Buffer::host(vec![4u32, 5]);
    buf.move_to(Residency::Device).unwrap();
    assert_eq!(buf.residency(), Residency::Device);
    assert_eq!(&*buf, &[4, 5]);
}

#[test]
fn stage_borrows_when_resident() {
    let buf = Buffer::device(vec![1u8, 2]);
    let staged = buf.stage(Residency::Device).unwrap();
    assert!(!staged.is_copy());
    assert_eq!(staged.as_ptr(), buf.as_ptr());
}

#[test]
fn stage_copies_and_leaves_source_untouched() {
    let buf = Buffer::host(vec![7u64, 8, 9]);
    {
        let staged = buf.stage(Residency::Device).unwrap();
        assert!(staged.is_copy());
        assert_eq!(staged.residency(), Residency::Device);
        assert_eq!(&*staged, &[7, 8, 9]);
    }
    assert_eq!(buf.residency(), Residency::Host);
    assert_eq!(&*buf, &[7, 8, 9]);
}

#[test]
fn try_filled_vec_fills() {
    let v = try_filled_vec(4, 3u16).unwrap();
    assert_eq!(v, vec![3, 3, 3, 3]);
}

#[test]
fn impossible_reservation_reports_allocation_error() {
    let err = try_vec_with_capacity::<u64>(usize::MAX / 4).unwrap_err();
    assert!(matches!(err, GraphError::Allocation { .. }));
}
