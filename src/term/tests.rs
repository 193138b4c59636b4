//! Unit tests for the term buffer poll loop.

use bytes::{BufMut, BytesMut};
use rstest::{fixture, rstest};
use tracing_test::traced_test;

use super::TermReader;
use crate::{
    assembler::{FragmentAssembler, Message},
    fragmenter::Fragmenter,
    frame::{FrameFlags, FrameHeader, HEADER_LENGTH, HeaderError, SessionId, StreamId},
};

#[fixture]
fn fragmenter() -> Fragmenter {
    Fragmenter::new(96, SessionId::new(1), StreamId::new(2), 0).expect("valid mtu")
}

/// Frame positions reported to a handler.
type Seen = Vec<(usize, usize, FrameFlags)>;

fn record(seen: &mut Seen) -> impl FnMut(&[u8], usize, usize, &FrameHeader) + '_ {
    move |_: &[u8], offset: usize, length: usize, header: &FrameHeader| {
        seen.push((offset, length, header.flags()));
    }
}

fn put_padding(term: &mut BytesMut, frame_length: usize) {
    let header = FrameHeader::padding(
        SessionId::new(1),
        StreamId::new(2),
        i32::try_from(term.len()).expect("offset fits"),
        i32::try_from(frame_length).expect("length fits"),
    );
    header.encode(term);
    term.put_bytes(0, frame_length - HEADER_LENGTH);
}

#[rstest]
fn dispatches_frames_in_order(mut fragmenter: Fragmenter) {
    let mut term = BytesMut::new();
    fragmenter
        .fragment(vec![5_u8; 100])
        .expect("fragment")
        .write_to(&mut term);
    let mut seen = Seen::new();
    let mut reader = TermReader::new();

    let read = reader.poll(&term, &mut record(&mut seen), 10).expect("poll");

    assert_eq!(read, 2);
    assert_eq!(
        seen,
        vec![(32, 64, FrameFlags::BEGIN), (128, 36, FrameFlags::END)]
    );
    assert_eq!(reader.offset(), 192);
}

#[rstest]
fn stops_at_unwritten_space_and_resumes(mut fragmenter: Fragmenter) {
    let mut term = BytesMut::new();
    fragmenter
        .fragment(&b"first"[..])
        .expect("fragment")
        .write_to(&mut term);
    let written = term.len();
    term.put_bytes(0, 256);
    let mut seen = Seen::new();
    let mut reader = TermReader::new();

    assert_eq!(reader.poll(&term, &mut record(&mut seen), 10), Ok(1));
    assert_eq!(reader.poll(&term, &mut record(&mut seen), 10), Ok(0));
    assert_eq!(reader.offset(), written);

    term.truncate(written);
    fragmenter
        .fragment(&b"second"[..])
        .expect("fragment")
        .write_to(&mut term);

    assert_eq!(reader.poll(&term, &mut record(&mut seen), 10), Ok(1));
    assert_eq!(seen.len(), 2);
}

#[rstest]
fn fragment_limit_bounds_each_poll(mut fragmenter: Fragmenter) {
    let mut term = BytesMut::new();
    fragmenter
        .fragment(vec![0_u8; 64 * 5])
        .expect("fragment")
        .write_to(&mut term);
    let mut seen = Seen::new();
    let mut reader = TermReader::new();

    assert_eq!(reader.poll(&term, &mut record(&mut seen), 2), Ok(2));
    assert_eq!(reader.poll(&term, &mut record(&mut seen), 2), Ok(2));
    assert_eq!(reader.poll(&term, &mut record(&mut seen), 2), Ok(1));
    assert_eq!(reader.poll(&term, &mut record(&mut seen), 2), Ok(0));
    assert_eq!(seen.len(), 5);
}

#[rstest]
#[traced_test]
fn padding_is_skipped_without_counting(fragmenter: Fragmenter) {
    let mut term = BytesMut::new();
    put_padding(&mut term, 128);
    let mut fragmenter = fragmenter.with_term_offset(128);
    fragmenter
        .fragment(&b"after padding"[..])
        .expect("fragment")
        .write_to(&mut term);
    let mut seen = Seen::new();
    let mut reader = TermReader::new();

    assert_eq!(reader.poll(&term, &mut record(&mut seen), 1), Ok(1));
    assert_eq!(seen, vec![(160, 13, FrameFlags::UNFRAGMENTED)]);
    assert!(logs_contain("skipping padding frame"));
}

#[test]
#[traced_test]
fn truncated_frame_is_reported_and_offset_kept() {
    let header = FrameHeader::data(
        SessionId::new(1),
        StreamId::new(2),
        FrameFlags::UNFRAGMENTED,
        200,
    );
    let mut term = BytesMut::new();
    header.encode(&mut term);
    term.put_bytes(7, 64);
    let mut seen = Seen::new();
    let mut reader = TermReader::new();

    let err = reader
        .poll(&term, &mut record(&mut seen), 10)
        .expect_err("frame runs past the term");

    assert_eq!(
        err,
        HeaderError::Truncated {
            offset: 0,
            frame_length: 232,
            available: 96,
        }
    );
    assert_eq!(reader.offset(), 0);
    assert!(seen.is_empty());
    assert!(logs_contain("malformed frame in term"));
}

#[rstest]
#[case::negative(-64)]
#[case::below_header(16)]
fn undersized_padding_is_rejected(#[case] frame_length: i32) {
    let header = FrameHeader::padding(SessionId::new(1), StreamId::new(2), 0, frame_length);
    let mut term = BytesMut::new();
    header.encode(&mut term);
    let mut reader = TermReader::new();
    let mut seen = Seen::new();

    let err = reader
        .poll(&term, &mut record(&mut seen), 10)
        .expect_err("padding must hold its header");

    assert!(matches!(err, HeaderError::FrameTooShort { .. }));
}

#[rstest]
fn reset_rereads_the_term(mut fragmenter: Fragmenter) {
    let mut term = BytesMut::new();
    fragmenter
        .fragment(&b"again"[..])
        .expect("fragment")
        .write_to(&mut term);
    let mut seen = Seen::new();
    let mut reader = TermReader::new();

    assert_eq!(reader.poll(&term, &mut record(&mut seen), 10), Ok(1));
    reader.reset();
    assert_eq!(reader.offset(), 0);
    assert_eq!(reader.poll(&term, &mut record(&mut seen), 10), Ok(1));
    assert_eq!(seen.len(), 2);
}

#[rstest]
fn feeds_the_assembler(mut fragmenter: Fragmenter) {
    let payload: Vec<u8> = (0..=255).collect();
    let mut term = BytesMut::new();
    fragmenter
        .fragment(payload.clone())
        .expect("fragment")
        .write_to(&mut term);
    let mut received = Vec::new();
    let mut assembler = FragmentAssembler::new(|message: Message<'_>| {
        received.push((message.to_vec(), *message.header()));
    });

    let read = TermReader::new()
        .poll(&term, &mut assembler, 100)
        .expect("poll");
    drop(assembler);

    assert_eq!(read, 4);
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].0, payload);
    assert!(received[0].1.is_unfragmented());
    assert_eq!(received[0].1.payload_length(), 256);
}
