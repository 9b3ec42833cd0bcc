use lpbo_archive::{PboReader, PboWriter};
use lpbo_core::PboError;
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::io::Cursor;

/// Unique archive names mapped to payloads.
fn files() -> impl Strategy<Value = BTreeMap<String, Vec<u8>>> {
    prop::collection::btree_map(
        "[a-z]{1,8}(\\\\[a-z0-9_]{1,8}){0,2}\\.[a-z]{1,3}",
        prop::collection::vec(any::<u8>(), 0..64),
        0..8,
    )
}

fn build(files: &BTreeMap<String, Vec<u8>>) -> Vec<u8> {
    let mut writer = PboWriter::new(Vec::new());
    writer.add_extension("prefix", "prop");
    for (name, data) in files {
        writer.add_file(name, data.clone()).unwrap();
    }
    writer.finish().unwrap()
}

proptest! {
    #[test]
    fn roundtrip(files in files()) {
        let bytes = build(&files);
        let mut reader = PboReader::new(Cursor::new(bytes)).unwrap();

        let names: Vec<String> = reader.list().map(str::to_owned).collect();
        prop_assert_eq!(names, files.keys().cloned().collect::<Vec<_>>());
        for (name, data) in &files {
            prop_assert_eq!(&reader.extract_to_vec(name).unwrap(), data);
        }
    }

    #[test]
    fn truncated_header_fails(files in files(), cut in 0usize..4096) {
        let bytes = build(&files);
        let header_len = {
            let reader = PboReader::new(Cursor::new(bytes.clone())).unwrap();
            let payload: u64 = reader.header().payload_len();
            bytes.len() - payload as usize - 21
        };
        let len = cut % header_len;

        match PboReader::new(Cursor::new(bytes[..len].to_vec())) {
            Err(PboError::MalformedHeader { .. } | PboError::TruncatedInput { .. }) => {}
            other => prop_assert!(false, "prefix of {} bytes gave {:?}", len, other.err()),
        }
    }
}
