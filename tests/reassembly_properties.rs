//! Property tests for reassembly under arbitrary fragmentation and
//! interleaving.

use frameweave::{FragmentAssembler, Fragmenter, SessionId, StreamId, TermReader};
use frameweave_testing::{RecordingHandler, TestFrame, interleave, write_term};
use proptest::prelude::*;

#[derive(Debug, Clone)]
struct Publication {
    messages: Vec<Vec<u8>>,
    chunk: usize,
}

prop_compose! {
    fn publication()
        (
            messages in proptest::collection::vec(
                proptest::collection::vec(any::<u8>(), 0..600),
                1..4
            ),
            chunk in 1_usize..200
        ) -> Publication {
            Publication { messages, chunk }
        }
}

fn frames_for(session: i32, publication: &Publication) -> Vec<TestFrame> {
    publication
        .messages
        .iter()
        .flat_map(|message| {
            TestFrame::split(
                SessionId::new(session),
                StreamId::new(1),
                message,
                publication.chunk,
            )
        })
        .collect()
}

proptest! {
    #[test]
    fn interleaved_sessions_reassemble_exactly(
        publications in proptest::collection::vec(publication(), 1..6),
        picks in proptest::collection::vec(any::<usize>(), 0..400)
    ) {
        let sequences = publications
            .iter()
            .zip(0..)
            .map(|(publication, session)| frames_for(session, publication))
            .collect();
        let mut assembler = FragmentAssembler::new(RecordingHandler::default());

        for frame in interleave(sequences, &picks) {
            frame.deliver(&mut assembler);
        }

        for (publication, session) in publications.iter().zip(0..) {
            prop_assert_eq!(
                assembler.handler().payloads_for(SessionId::new(session)),
                publication.messages.clone()
            );
        }
        prop_assert!(assembler.table().is_empty());
        prop_assert_eq!(assembler.counters().orphaned_fragments, 0);
    }

    #[test]
    fn fragmenter_output_round_trips_through_a_term(
        payload in proptest::collection::vec(any::<u8>(), 0..8192),
        mtu_blocks in 2_usize..64
    ) {
        let mut fragmenter =
            Fragmenter::new(mtu_blocks * 32, SessionId::new(7), StreamId::new(3), 0)
                .expect("valid mtu");
        let batch = fragmenter.fragment(payload.clone()).expect("fragment");
        let term = write_term([&batch]);
        let mut assembler = FragmentAssembler::new(RecordingHandler::default());

        let read = TermReader::new()
            .poll(&term, &mut assembler, usize::MAX)
            .expect("poll");

        prop_assert_eq!(read, batch.len());
        prop_assert_eq!(assembler.handler().payloads(), vec![payload]);
    }
}
