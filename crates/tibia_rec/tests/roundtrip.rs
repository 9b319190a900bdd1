use proptest::prelude::*;
use tibia_rec::{reassemble, Frame, Recording};

fn arb_recording() -> impl Strategy<Value = Recording> {
    let frames = prop::collection::vec(
        (0u32..5_000, prop::collection::vec(any::<u8>(), 1..64)),
        1..32,
    );

    (any::<u16>(), frames).prop_map(|(version, frames)| {
        let mut time = 0u32;
        let frames = frames
            .into_iter()
            .map(|(delta, data)| {
                time += delta;
                Frame::new(time, data)
            })
            .collect();
        Recording::new(Some(version), frames)
    })
}

fn prefixed(frames: &[Frame]) -> Vec<Frame> {
    frames
        .iter()
        .map(|frame| {
            let mut data = (frame.data.len() as u16).to_le_bytes().to_vec();
            data.extend_from_slice(&frame.data);
            Frame::new(frame.time, data)
        })
        .collect()
}

/// Cut `stream` into reads of the given sizes, the last read takes whatever is left
fn split(stream: &[u8], sizes: &[usize]) -> Vec<Frame> {
    let mut reads = Vec::new();
    let mut rest = stream;
    for (index, &size) in sizes.iter().enumerate() {
        if rest.is_empty() {
            break;
        }
        let (read, tail) = rest.split_at(size.min(rest.len()));
        reads.push(Frame::new(index as u32 * 10, read));
        rest = tail;
    }
    if !rest.is_empty() {
        reads.push(Frame::new(sizes.len() as u32 * 10, rest));
    }
    reads
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn trp_save_then_load(recording in arb_recording()) {
        let dir = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let path = dir.path().join("session.trp");

        tibia_rec::save(&recording, &path)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let decoded = tibia_rec::load(&path, false)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert!(!decoded.is_partial());
        prop_assert_eq!(decoded.into_recording(), recording);
    }

    #[test]
    fn packets_survive_any_split(
        packets in prop::collection::vec(prop::collection::vec(any::<u8>(), 1..64), 1..16),
        sizes in prop::collection::vec(1usize..48, 0..32),
    ) {
        let stream: Vec<u8> = packets
            .iter()
            .flat_map(|packet| {
                let mut data = (packet.len() as u16).to_le_bytes().to_vec();
                data.extend_from_slice(packet);
                data
            })
            .collect();

        let result = reassemble(&split(&stream, &sizes));
        let data: Vec<_> = result.frames.iter().map(|frame| frame.data.clone()).collect();

        prop_assert_eq!(result.dangling, 0);
        prop_assert_eq!(&data, &packets);
        prop_assert!(result.frames.windows(2).all(|pair| pair[0].time <= pair[1].time));

        let again = reassemble(&prefixed(&result.frames));
        prop_assert_eq!(again.dangling, 0);
        prop_assert_eq!(again.frames, result.frames);
    }

    #[test]
    fn arbitrary_reads_never_panic(
        reads in prop::collection::vec((any::<u32>(), prop::collection::vec(any::<u8>(), 0..32)), 0..16),
    ) {
        let raw: Vec<Frame> = reads.into_iter().map(|(time, data)| Frame::new(time, data)).collect();
        let total: usize = raw.iter().map(|frame| frame.data.len()).sum();

        let result = reassemble(&raw);
        let used: usize = result.frames.iter().map(|frame| frame.data.len() + 2).sum();

        prop_assert!(used + result.dangling <= total);
        prop_assert!(result.frames.iter().all(|frame| !frame.data.is_empty()));
    }
}
