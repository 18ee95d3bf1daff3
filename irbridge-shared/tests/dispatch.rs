use std::collections::VecDeque;

use irbridge_shared::protocol::{ACTION_INFRARED, FRAME_LEN, REPEAT_CODE};
use irbridge_shared::{
    CaptureEngine, Capturer, DecodeEngine, DispatchConfig, Dispatcher, Frame, FrameParser,
    Outcome, ProtocolId, RawCapture, TextDiagnostics,
};

const SAMPLERATE: u32 = 40_000;

/// Reports prepared results in order and remembers the captures it was shown
struct ScriptedDecoder {
    script: VecDeque<(ProtocolId, u32, u8)>,
    current: (ProtocolId, u32, u8),
    seen: Vec<Vec<u16>>,
}

impl ScriptedDecoder {
    fn new(script: &[(ProtocolId, u32, u8)]) -> Self {
        ScriptedDecoder {
            script: script.iter().copied().collect(),
            current: (ProtocolId::UNKNOWN, 0, 0),
            seen: Vec::new(),
        }
    }
}

impl DecodeEngine for ScriptedDecoder {
    fn decode(&mut self, capture: &RawCapture<'_>) {
        self.seen.push(capture.samples().to_vec());
        self.current = self
            .script
            .pop_front()
            .unwrap_or((ProtocolId::UNKNOWN, 0, 0));
    }

    fn protocol(&self) -> ProtocolId {
        self.current.0
    }

    fn value(&self) -> u32 {
        self.current.1
    }

    fn bits(&self) -> u8 {
        self.current.2
    }
}

type Bridge = Dispatcher<
    Capturer,
    ScriptedDecoder,
    heapless::Vec<u8, 256>,
    TextDiagnostics<heapless::Vec<u8, 256>>,
>;

fn bridge(script: &[(ProtocolId, u32, u8)]) -> Bridge {
    Dispatcher::new(
        Capturer::new(SAMPLERATE),
        ScriptedDecoder::new(script),
        heapless::Vec::new(),
        TextDiagnostics::new(heapless::Vec::new()),
        DispatchConfig::default(),
    )
}

/// Play one transmission into the capturer, polling after every sample like the
/// main loop would. Returns the timestamp after the closing idle period.
fn transmit(
    bridge: &mut Bridge,
    mut ts: u32,
    widths: &[u32],
    outcomes: &mut Vec<Outcome>,
) -> u32 {
    let mut level = true;
    for width in widths {
        ts += width;
        bridge.capture_mut().sample(level, ts);
        level = !level;
        outcomes.extend(bridge.poll());
    }

    // Widths has an even length so the line ends idle
    for _ in 0..3 {
        ts += SAMPLERATE / 10;
        bridge.capture_mut().sample(false, ts);
        outcomes.extend(bridge.poll());
    }

    ts
}

#[test]
fn code_repeat_and_unknown() {
    let mut bridge = bridge(&[
        (ProtocolId::NEC, 0x20DF_10EF, 32),
        (ProtocolId::NEC, REPEAT_CODE, 0),
        (ProtocolId::UNKNOWN, 0, 0),
    ]);

    let mut outcomes = Vec::new();

    let ts = transmit(&mut bridge, 0, &[8_000, 360, 180, 22], &mut outcomes);
    assert_eq!(outcomes.len(), 1);

    let ts = transmit(&mut bridge, ts, &[4_000, 360, 90, 22], &mut outcomes);
    assert_eq!(outcomes.len(), 2);

    transmit(&mut bridge, ts, &[6_000, 50, 70, 30, 30, 51], &mut outcomes);
    assert_eq!(outcomes.len(), 3);

    assert!(matches!(outcomes[0], Outcome::Emitted(_)));
    assert!(matches!(outcomes[1], Outcome::Suppressed(_)));
    match &outcomes[2] {
        Outcome::Unrecognized(payload) => {
            assert_eq!(payload.samples(), &[50, 70, 30, 30, 51]);
        }
        other => panic!("unexpected outcome {:?}", other),
    }

    // Every capture was handed over exactly once. The gap counts from the last
    // edge of the previous transmission, idle time included.
    assert_eq!(
        bridge.decoder().seen,
        vec![
            vec![8_000, 360, 180, 22],
            vec![16_000, 360, 90, 22],
            vec![18_000, 50, 70, 30, 30, 51],
        ]
    );
    assert!(!bridge.capture().is_ready());

    let (_, _, transport, diagnostics) = bridge.release();

    assert_eq!(transport.len(), FRAME_LEN);
    let mut parser = FrameParser::new(ACTION_INFRARED);
    let frames: Vec<Frame> = transport.iter().filter_map(|b| parser.feed(*b)).collect();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].event.protocol, ProtocolId::NEC);
    assert_eq!(frames[0].event.value, 0x20DF_10EF);
    assert_eq!(frames[0].event.bits, 32);

    assert_eq!(&diagnostics.into_inner()[..], b"50 70 30 30 51\r\n");
}

#[test]
fn unknown_capture_of_five_writes_four_tokens() {
    let mut bridge = bridge(&[(ProtocolId::UNKNOWN, 0, 0)]);
    let mut outcomes = Vec::new();

    // Odd number of widths, the line ends active and the timeout fires on a mark
    let mut ts: u32 = 0;
    let mut level = true;
    for width in &[9_000u32, 100, 200, 300, 400] {
        ts += *width;
        bridge.capture_mut().sample(level, ts);
        level = !level;
    }
    bridge.capture_mut().sample(true, ts + SAMPLERATE);
    outcomes.extend(bridge.poll());

    assert_eq!(outcomes.len(), 1);
    let (_, _, transport, diagnostics) = bridge.release();
    let text = diagnostics.into_inner();
    let tokens: Vec<&str> = std::str::from_utf8(&text).unwrap().split_whitespace().collect();

    assert!(transport.is_empty());
    assert_eq!(tokens, vec!["100", "200", "300", "400"]);
}
