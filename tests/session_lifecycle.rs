//! Per-session assembly behaviour across interleaving, anomalies and
//! teardown.

use frameweave::{
    FragmentAssembler,
    FrameFlags,
    FrameHandler,
    FrameOutcome,
    SessionId,
    StreamId,
};
use frameweave_testing::{RecordingHandler, TestFrame, interleave};
use rstest::{fixture, rstest};

type Assembler = FragmentAssembler<RecordingHandler>;

const STREAM: StreamId = StreamId::new(20);

#[fixture]
fn assembler() -> Assembler { FragmentAssembler::new(RecordingHandler::default()) }

fn frame(session: i32, flags: FrameFlags, payload: &[u8]) -> TestFrame {
    TestFrame::new(SessionId::new(session), STREAM, flags, payload)
}

fn deliver(assembler: &mut Assembler, frame: &TestFrame) -> FrameOutcome {
    assembler.on_frame(&frame.payload, 0, frame.payload.len(), &frame.header)
}

#[rstest]
fn round_robin_sessions_each_complete(mut assembler: Assembler) {
    let payloads: Vec<Vec<u8>> = (0..8_u8)
        .map(|s| vec![s; 100 + usize::from(s) * 17])
        .collect();
    let sequences = payloads
        .iter()
        .zip(0..)
        .map(|(payload, session)| {
            TestFrame::split(SessionId::new(session), STREAM, payload, 16)
        })
        .collect();
    let picks: Vec<usize> = (0..200).collect();

    for frame in interleave(sequences, &picks) {
        frame.deliver(&mut assembler);
    }

    for (payload, session) in payloads.iter().zip(0..) {
        assert_eq!(
            assembler.handler().payloads_for(SessionId::new(session)),
            vec![payload.clone()],
            "session {session}"
        );
    }
    assert!(assembler.table().is_empty());
}

#[rstest]
fn second_begin_keeps_only_the_newer_message(mut assembler: Assembler) {
    deliver(&mut assembler, &frame(1, FrameFlags::BEGIN, b"AAAA"));
    deliver(&mut assembler, &frame(1, FrameFlags::BEGIN, b"BBBB"));
    deliver(&mut assembler, &frame(1, FrameFlags::END, b"bbbb"));

    assert_eq!(assembler.handler().payloads(), vec![b"BBBBbbbb".to_vec()]);
    assert_eq!(assembler.counters().restarted_assemblies, 1);
}

#[rstest]
fn orphans_do_not_disturb_other_sessions(mut assembler: Assembler) {
    deliver(&mut assembler, &frame(1, FrameFlags::BEGIN, b"keep "));
    assert_eq!(
        deliver(&mut assembler, &frame(2, FrameFlags::NONE, b"stray")),
        FrameOutcome::DroppedOrphan
    );
    assert_eq!(
        deliver(&mut assembler, &frame(2, FrameFlags::END, b"stray")),
        FrameOutcome::DroppedOrphan
    );
    assert_eq!(assembler.table().len(), 1);
    deliver(&mut assembler, &frame(1, FrameFlags::END, b"going"));

    assert_eq!(assembler.handler().payloads(), vec![b"keep going".to_vec()]);
    assert_eq!(assembler.counters().orphaned_fragments, 2);
}

#[rstest]
fn session_reuses_its_slot_for_consecutive_messages(mut assembler: Assembler) {
    for round in 0..5_u8 {
        let payload = vec![round; 300];
        for piece in TestFrame::split(SessionId::new(9), STREAM, &payload, 64) {
            piece.deliver(&mut assembler);
        }
        assert!(assembler.table().is_empty());
        assert_eq!(assembler.table().pooled(), 1);
    }
    assert_eq!(assembler.handler().messages().len(), 5);
}

#[rstest]
fn teardown_through_frame_handler_releases_into_pool(mut assembler: Assembler) {
    deliver(&mut assembler, &frame(1, FrameFlags::BEGIN, b"partial"));
    deliver(&mut assembler, &frame(2, FrameFlags::BEGIN, b"partial"));

    FrameHandler::on_session_inactive(&mut assembler, SessionId::new(1));

    assert!(!assembler.table().contains(SessionId::new(1)));
    assert!(assembler.table().contains(SessionId::new(2)));
    assert_eq!(assembler.table().pooled(), 1);
    assert_eq!(assembler.counters().abandoned_assemblies, 1);
}

#[rstest]
fn thousands_of_sessions_leave_nothing_behind(mut assembler: Assembler) {
    for session in 0..2000 {
        deliver(&mut assembler, &frame(session, FrameFlags::BEGIN, b"head-"));
    }
    assert_eq!(assembler.table().len(), 2000);
    for session in 0..2000 {
        deliver(&mut assembler, &frame(session, FrameFlags::END, b"tail"));
    }

    assert!(assembler.table().is_empty());
    assert_eq!(assembler.table().buffered_bytes(), 0);
    assert!(assembler.table().pooled() <= assembler.config().max_pooled_buffers);
    assert_eq!(assembler.counters().reassembled_messages, 2000);
}

#[rstest]
fn subscription_close_releases_everything(mut assembler: Assembler) {
    for session in 0..10 {
        deliver(&mut assembler, &frame(session, FrameFlags::BEGIN, b"open"));
    }

    assert_eq!(assembler.release_all(), 10);
    assert!(assembler.table().is_empty());
    assert!(assembler.handler().messages().is_empty());
}
