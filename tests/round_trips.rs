use std::{error::Error, fmt::Debug, sync::Arc};

use zarrs_v2::{
    array::{
        codec::BytesToBytesCodecTraits, Array, ArrayBuilder, DataType, Element, Endianness,
        FillValue,
    },
    metadata::v2::{ArrayMetadataV2, GroupMetadataV2},
    node::NodePath,
    storage::{
        create_array, create_group, meta_key_v2_array, meta_key_v2_group,
        store::MemoryStore, ReadableStorageTraits, StoreKey,
    },
};

pub fn to_json(data: &[u8]) -> serde_json::Value {
    let data = std::str::from_utf8(data).unwrap();
    serde_json::from_str(data).unwrap()
}

fn compressor(
    codec: impl BytesToBytesCodecTraits + 'static,
) -> Option<Arc<dyn BytesToBytesCodecTraits>> {
    Some(Arc::new(codec))
}

fn compressors() -> Vec<Option<Arc<dyn BytesToBytesCodecTraits>>> {
    vec![
        None,
        #[cfg(feature = "zlib")]
        compressor(zarrs_v2::array::codec::ZlibCodec::new(5).unwrap()),
        #[cfg(feature = "gzip")]
        compressor(zarrs_v2::array::codec::GzipCodec::new(9).unwrap()),
        #[cfg(feature = "zstd")]
        compressor(zarrs_v2::array::codec::ZstdCodec::new(3.into(), false)),
        #[cfg(feature = "zstd")]
        compressor(zarrs_v2::array::codec::ZstdCodec::new((-1).into(), true)),
    ]
}

/// Write `elements` as one chunk and read it back, for every byte order and compressor.
fn chunk_round_trip<T: Element + PartialEq + Debug>(
    data_type: DataType,
    fill_value: FillValue,
    elements: &[T],
) -> Result<(), Box<dyn Error>> {
    let chunk_shape = vec![elements.len() as u64 / 2, 2];
    for endianness in [Endianness::Little, Endianness::Big] {
        for compressor in compressors() {
            let store = Arc::new(MemoryStore::new());
            let array = ArrayBuilder::new(
                vec![chunk_shape[0] * 3, 4],
                data_type,
                chunk_shape.clone().try_into()?,
                fill_value.clone(),
            )
            .endianness(endianness)
            .compressor(compressor.clone())
            .build(store.clone(), "/array")?;
            array.store_metadata()?;
            array.store_chunk_elements(&[2, 1], elements)?;

            // reopen from the stored metadata
            let array = Array::new(store, "/array")?;
            assert_eq!(array.retrieve_chunk_elements::<T>(&[2, 1])?, elements);
            let fill = array.retrieve_chunk_elements::<T>(&[0, 0])?;
            assert_eq!(fill.len(), elements.len());
            assert!(fill.iter().all(|element| element == &fill[0]));
        }
    }
    Ok(())
}

#[test]
fn round_trip_bool() -> Result<(), Box<dyn Error>> {
    chunk_round_trip(
        DataType::Bool,
        FillValue::from(true),
        &[true, false, false, true, true, true],
    )
}

#[test]
fn round_trip_integers() -> Result<(), Box<dyn Error>> {
    chunk_round_trip(DataType::Int8, FillValue::from(-1i8), &[i8::MIN, -1, 0, 1, 2, i8::MAX])?;
    chunk_round_trip(DataType::Int16, FillValue::from(-1i16), &[i16::MIN, -1, 0, 1, 0x0102, i16::MAX])?;
    chunk_round_trip(DataType::Int32, FillValue::from(-1i32), &[i32::MIN, -1, 0, 1, 0x0102_0304, i32::MAX])?;
    chunk_round_trip(DataType::Int64, FillValue::from(-1i64), &[i64::MIN, -1, 0, 1, 0x0102_0304_0506_0708, i64::MAX])?;
    chunk_round_trip(DataType::UInt8, FillValue::from(1u8), &[0u8, 1, 2, 3, 4, u8::MAX])?;
    chunk_round_trip(DataType::UInt16, FillValue::from(1u16), &[0u16, 1, 2, 3, 0x0102, u16::MAX])?;
    chunk_round_trip(DataType::UInt32, FillValue::from(1u32), &[0u32, 1, 2, 3, 0x0102_0304, u32::MAX])?;
    chunk_round_trip(DataType::UInt64, FillValue::from(1u64), &[0u64, 1, 2, 3, 0x0102_0304_0506_0708, u64::MAX])?;
    Ok(())
}

#[test]
fn round_trip_floats() -> Result<(), Box<dyn Error>> {
    chunk_round_trip(
        DataType::Float32,
        FillValue::from(f32::INFINITY),
        &[f32::MIN, -1.5, 0.0, 1.0e-3, f32::EPSILON, f32::MAX],
    )?;
    chunk_round_trip(
        DataType::Float64,
        FillValue::from(f64::NEG_INFINITY),
        &[f64::MIN, -1.5, 0.0, 1.0e-3, f64::EPSILON, f64::MAX],
    )?;
    Ok(())
}

#[test]
fn round_trip_fixed_width() -> Result<(), Box<dyn Error>> {
    chunk_round_trip(
        DataType::FixedBytes(3),
        FillValue::from(b"abc".to_vec()),
        &[*b"xyz", [0, 1, 2], [255, 254, 253], *b"   ", *b"a\0\0", *b"zzz"],
    )?;
    let text = |s: &str| -> [u32; 2] {
        let mut chars = s.chars().map(u32::from);
        [chars.next().unwrap_or(0), chars.next().unwrap_or(0)]
    };
    chunk_round_trip(
        DataType::FixedString(2),
        FillValue::from(vec![0u8; 8]),
        &[text("ab"), text("é"), text(""), text("Zß"), text("日本"), text("x")],
    )?;
    Ok(())
}

#[test]
fn round_trip_stored_byte_order() -> Result<(), Box<dyn Error>> {
    let store = Arc::new(MemoryStore::new());
    for (endianness, path, expected) in [
        (Endianness::Big, "/big", [0x01u8, 0x02, 0x03, 0x04]),
        (Endianness::Little, "/little", [0x04, 0x03, 0x02, 0x01]),
    ] {
        let array = ArrayBuilder::new(
            vec![1],
            DataType::UInt32,
            vec![1].try_into()?,
            FillValue::from(0u32),
        )
        .endianness(endianness)
        .build(store.clone(), path)?;
        array.store_chunk_elements(&[0], &[0x0102_0304u32])?;
        let key = StoreKey::new(format!("{}/0", &path[1..]))?;
        assert_eq!(store.get(&key)?.unwrap().as_ref(), &expected);
    }
    Ok(())
}

#[cfg(all(feature = "zlib", feature = "zstd"))]
#[test]
fn array_metadata_round_trip_memory() -> Result<(), Box<dyn Error>> {
    for json in [
        r#"{
            "chunks": [1000, 1000],
            "compressor": {"id": "zlib", "level": 1},
            "dimension_separator": ".",
            "dtype": "<f8",
            "fill_value": "NaN",
            "filters": null,
            "order": "C",
            "shape": [10000, 10000],
            "zarr_format": 2
        }"#,
        r#"{
            "chunks": [5, 6],
            "compressor": null,
            "dimension_separator": "/",
            "dtype": ">i4",
            "fill_value": 42,
            "filters": null,
            "order": "C",
            "shape": [10, 15],
            "zarr_format": 2
        }"#,
        r#"{
            "chunks": [2],
            "compressor": {"id": "zstd", "level": 1, "checksum": true},
            "dimension_separator": ".",
            "dtype": "|S4",
            "fill_value": "AAAAAA==",
            "filters": null,
            "order": "C",
            "shape": [3],
            "zarr_format": 2
        }"#,
    ] {
        let json: serde_json::Value = serde_json::from_str(json)?;
        let metadata: ArrayMetadataV2 = serde_json::from_value(json.clone())?;

        let store = Arc::new(MemoryStore::new());
        let path: NodePath = "/array".try_into()?;
        create_array(&*store, &path, &metadata)?;
        let json_cmp = to_json(&store.get(&meta_key_v2_array(&path))?.unwrap());
        assert_eq!(json, json_cmp);

        // the array model reproduces the same document
        let array = Array::new(store, "/array")?;
        assert_eq!(array.metadata(), metadata);
        assert_eq!(serde_json::to_value(array.metadata())?, json);
    }
    Ok(())
}

#[test]
fn group_metadata_round_trip_memory() -> Result<(), Box<dyn Error>> {
    let json: serde_json::Value = serde_json::from_str(r#"{"zarr_format": 2}"#)?;
    let group: GroupMetadataV2 = serde_json::from_value(json.clone())?;

    let store = MemoryStore::new();
    create_group(&store, &"/group".try_into()?, &group)?;
    let json_cmp = to_json(&store.get(&meta_key_v2_group(&"/group".try_into()?))?.unwrap());
    assert_eq!(json, json_cmp);

    assert!(serde_json::from_str::<GroupMetadataV2>(r#"{"zarr_format": 3}"#).is_err());
    Ok(())
}
