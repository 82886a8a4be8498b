use crate::storage::error::StorageSystemError;
use crate::storage::handle::CollisionPolicy;
use crate::storage::location::StorageLocation;
use crate::storage::payload::{BYTES_PER_PIXEL, PayloadKind, PixelBuffer};

#[test]
fn test_payload_collision_policies() {
    assert_eq!(PayloadKind::Text.collision_policy(), CollisionPolicy::OpenIfExists);
    assert_eq!(PayloadKind::ByteStream.collision_policy(), CollisionPolicy::OpenIfExists);
    assert_eq!(PayloadKind::PixelBuffer.collision_policy(), CollisionPolicy::ReplaceExisting);
}

#[test]
fn test_pixel_buffer_validates_length() {
    let ok = PixelBuffer::new(2, 3, vec![7; 2 * 3 * BYTES_PER_PIXEL]).unwrap();
    assert_eq!((ok.width(), ok.height()), (2, 3));
    assert_eq!(ok.as_bytes().len(), 24);

    let err = PixelBuffer::new(2, 3, vec![0; 23]).unwrap_err();
    assert!(matches!(err, StorageSystemError::InvalidPixelBuffer(_)));
}

#[test]
fn test_pixel_buffer_blank_and_empty() {
    let blank = PixelBuffer::blank(4, 4).unwrap();
    assert!(blank.as_bytes().iter().all(|b| *b == 0));
    assert_eq!(blank.into_bytes().len(), 64);

    let empty = PixelBuffer::new(0, 10, Vec::new()).unwrap();
    assert!(empty.as_bytes().is_empty());
}

#[test]
fn test_storage_location_names() {
    assert_eq!(StorageLocation::default(), StorageLocation::Local);
    for location in StorageLocation::ALL {
        let parsed: StorageLocation = location.as_str().parse().unwrap();
        assert_eq!(parsed, location);
    }
    assert_eq!("Roaming".parse::<StorageLocation>().unwrap(), StorageLocation::Roaming);
    assert!("cloud".parse::<StorageLocation>().is_err());
    assert_eq!(StorageLocation::Temporary.to_string(), "temporary");
}
