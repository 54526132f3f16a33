//! One request/response exchange.
//!
//! An exchange encodes the request, writes it, reads exactly one reply
//! frame and validates it in order: structure, message-id echo, result
//! code, payload length, then interpretation. Nothing is retried.

use std::io::{Read, Write};

use bytes::Bytes;
use tracing::trace;
use wss_frame::{
    decode, CommandCode, Field, Frame, FrameConfig, FrameError, FrameReader, FrameWriter,
};
use wss_transport::TransportError;

use crate::error::{Result, TransactionError};
use crate::shape::{interpret, ResponseSpec, Value};

/// Everything one exchange produced. Owned by the caller; nothing is
/// kept once it is dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub message_id: u8,
    pub command: CommandCode,
    /// Request bytes as written.
    pub request: Bytes,
    /// Reply bytes as read, markers included.
    pub response: Bytes,
    pub frame: Frame,
    pub value: Value,
}

/// Run one exchange with the default frame configuration and return the
/// interpreted value.
pub fn execute<T: Read + Write>(
    transport: &mut T,
    message_id: u8,
    command: CommandCode,
    fields: &[Field],
    spec: &ResponseSpec,
) -> Result<Value> {
    execute_exchange(
        transport,
        message_id,
        command,
        fields,
        spec,
        &FrameConfig::default(),
    )
    .map(|exchange| exchange.value)
}

/// Run one exchange and return the full [`Exchange`].
pub fn execute_exchange<T: Read + Write>(
    transport: &mut T,
    message_id: u8,
    command: CommandCode,
    fields: &[Field],
    spec: &ResponseSpec,
    config: &FrameConfig,
) -> Result<Exchange> {
    let request = FrameWriter::new(&mut *transport)
        .send_command(message_id, command, fields)
        .map_err(send_error)?;
    trace!(message_id, %command, request = ?request.as_ref(), "request sent");

    let response = FrameReader::with_config(&mut *transport, config.clone())
        .read_frame()
        .map_err(receive_error)?;
    trace!(message_id, response = ?response.as_ref(), "reply received");

    let frame = decode(&response).map_err(TransactionError::Malformed)?;
    if frame.message_id != message_id {
        return Err(TransactionError::IdMismatch {
            sent: message_id,
            received: frame.message_id,
        });
    }
    if !frame.is_success() {
        return Err(TransactionError::DeviceRejected(frame.code));
    }

    let value = interpret(spec, &frame.payload)?;
    Ok(Exchange {
        message_id,
        command,
        request,
        response,
        frame,
        value,
    })
}

fn send_error(err: FrameError) -> TransactionError {
    match err {
        FrameError::Io(io) => TransactionError::Transport(TransportError::Io(io)),
        FrameError::ConnectionClosed => TransactionError::Transport(TransportError::Closed),
        other => TransactionError::Encode(other),
    }
}

fn receive_error(err: FrameError) -> TransactionError {
    match err {
        FrameError::Io(io) => TransactionError::Transport(TransportError::Io(io)),
        FrameError::ConnectionClosed => TransactionError::Transport(TransportError::Closed),
        other => TransactionError::Malformed(other),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use wss_frame::{encode_command, encode_response, Address, RESULT_SUCCESS};
    use wss_transport::mock::ScriptedLink;

    use super::*;
    use crate::shape::Shape;

    const MIN_FREQ: Address = Address::new(0x06, 0x01, 0x10);
    const FREQUENCY: ResponseSpec = ResponseSpec::exact(Shape::Frequency);

    fn read_request(mid: u8) -> Bytes {
        encode_command(mid, CommandCode::Read, &[Field::read(MIN_FREQ)]).unwrap()
    }

    fn reply(mid: u8, result: u8, data: &[u8]) -> Vec<u8> {
        encode_response(mid, result, data).unwrap().to_vec()
    }

    #[test]
    fn minimum_frequency_bound_reads_300_ghz() {
        let mut link = ScriptedLink::new();
        link.expect(&read_request(0x01), &reply(0x01, RESULT_SUCCESS, &[0x60, 0x00]));

        let value = execute(
            &mut link,
            0x01,
            CommandCode::Read,
            &[Field::read(MIN_FREQ)],
            &FREQUENCY,
        )
        .unwrap();

        assert_eq!(value.as_ghz(), Some(300.0));
        assert_eq!(link.remaining(), 0);
    }

    #[test]
    fn exchange_keeps_raw_bytes() {
        let wire = reply(0x09, RESULT_SUCCESS, &[0x60, 0x00]);
        let mut link = ScriptedLink::new();
        link.reply(&wire);

        let exchange = execute_exchange(
            &mut link,
            0x09,
            CommandCode::Read,
            &[Field::read(MIN_FREQ)],
            &FREQUENCY,
            &FrameConfig::default(),
        )
        .unwrap();

        assert_eq!(exchange.request, read_request(0x09));
        assert_eq!(exchange.response.as_ref(), wire.as_slice());
        assert_eq!(exchange.frame.payload.as_ref(), &[0x60, 0x00]);
        assert_eq!(exchange.command, CommandCode::Read);
    }

    #[test]
    fn non_zero_result_is_rejected_without_interpreting_payload() {
        let mut link = ScriptedLink::new();
        link.reply(&reply(0x01, 0x01, &[0xFF, 0xFF, 0xFF]));

        let err = execute(
            &mut link,
            0x01,
            CommandCode::Read,
            &[Field::read(MIN_FREQ)],
            &FREQUENCY,
        )
        .unwrap_err();

        assert!(matches!(err, TransactionError::DeviceRejected(1)));
        assert!(!err.desynchronizes());
    }

    #[test]
    fn stale_reply_is_an_id_mismatch() {
        for stale in [0x00u8, 0x02, 0xFF] {
            let mut link = ScriptedLink::new();
            link.reply(&reply(stale, RESULT_SUCCESS, &[0x60, 0x00]));

            let err = execute(
                &mut link,
                0x01,
                CommandCode::Read,
                &[Field::read(MIN_FREQ)],
                &FREQUENCY,
            )
            .unwrap_err();

            assert!(matches!(
                err,
                TransactionError::IdMismatch { sent: 0x01, received } if received == stale
            ));
            assert!(err.desynchronizes());
        }
    }

    #[test]
    fn silent_line_times_out() {
        let mut link = ScriptedLink::new();
        link.silence();

        let err = execute(
            &mut link,
            0x01,
            CommandCode::Read,
            &[Field::read(MIN_FREQ)],
            &FREQUENCY,
        )
        .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.desynchronizes());
    }

    #[test]
    fn corrupted_reply_is_malformed() {
        let mut wire = reply(0x01, RESULT_SUCCESS, &[0x60, 0x00]);
        let chk = wire.len() - 3;
        wire[chk] ^= 0xFF;
        let mut link = ScriptedLink::new();
        link.reply(&wire);

        let err = execute(
            &mut link,
            0x01,
            CommandCode::Read,
            &[Field::read(MIN_FREQ)],
            &FREQUENCY,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TransactionError::Malformed(FrameError::ChecksumMismatch { .. })
        ));
    }

    #[test]
    fn wrong_payload_length_is_reported() {
        let mut link = ScriptedLink::new();
        link.reply(&reply(0x01, RESULT_SUCCESS, &[0x60, 0x00, 0x00]));

        let err = execute(
            &mut link,
            0x01,
            CommandCode::Read,
            &[Field::read(MIN_FREQ)],
            &FREQUENCY,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TransactionError::UnexpectedLength {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn invalid_request_is_an_encode_error_and_sends_nothing() {
        let mut link = ScriptedLink::new();
        let err = execute(
            &mut link,
            0x01,
            CommandCode::Write,
            &[Field::read(MIN_FREQ)],
            &ResponseSpec::ack(),
        )
        .unwrap_err();

        assert!(matches!(err, TransactionError::Encode(_)));
        assert!(link.sent().is_empty());
    }

    #[test]
    fn closed_stream_is_a_transport_error() {
        let mut stream = Cursor::new(Vec::<u8>::new());
        let err = execute(
            &mut stream,
            0x01,
            CommandCode::Read,
            &[Field::read(MIN_FREQ)],
            &FREQUENCY,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TransactionError::Transport(TransportError::Closed)
        ));
    }
}
