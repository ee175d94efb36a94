//! Integration tests for the text config codec and its interplay with the
//! binary codec.

use twiddler_core::codec::binary::{from_bytes, to_bytes};
use twiddler_core::codec::notation::{chord_from_text, chord_to_text};
use twiddler_core::{
    Chord, Command, Config, ConfigError, EmbeddedLayouts, LayoutTranslator, TextReader,
    TextWriter, UnknownPolicy,
};

const SAMPLE: &str = "\
# Sample layout
[config]
repeat = yes
haptic = off
nav_up_direction = east
nav_sensitivity = 2
idle_time = 900
repeat_delay = 120

[dedicated]
t1 = lctrl
F0M = mouse_middle

[mappings]
F0R = a
F0L = hyper_key_is_not_real
T1F2LM = lctrl+c
T0 = system:cycle_config
F1R = Q ! delay:50 haptic:1f
F4LMR = con:volume_up
    ms:left
";

fn translator() -> LayoutTranslator {
    LayoutTranslator::new(EmbeddedLayouts::builtin().expect("built-in layouts parse"))
}

#[test]
fn test_abort_policy_reports_first_unknown_key() {
    let t = translator();

    let err = TextReader::new(&t, "default").read_str(SAMPLE).unwrap_err();

    assert_eq!(err.to_string(), "invalid key: hyper_key_is_not_real");
}

#[test]
fn test_sample_reads_with_skip_policy() {
    let t = translator();

    let cfg = TextReader::new(&t, "default")
        .with_policy(UnknownPolicy::Skip)
        .read_str(SAMPLE)
        .unwrap();

    assert!(cfg.repeat);
    assert!(!cfg.haptic);
    assert_eq!(cfg.idle_time, 900);
    assert_eq!(cfg.repeat_delay, 12);
    assert_eq!(cfg.dedicated[0], 0x01);
    assert_eq!(cfg.dedicated[17], 0x0B);
    assert_eq!(cfg.mappings.len(), 5);

    let f1r = cfg.mapping(&chord_from_text("F1R")).unwrap();
    assert_eq!(
        f1r.commands,
        vec![
            Command::key(0x14, 0x20),
            Command::key(0x1E, 0x20),
            Command::delay(5),
            Command::haptic(0x1F),
        ]
    );
    let f4 = cfg.mapping(&chord_from_text("F4LMR")).unwrap();
    assert_eq!(f4.commands, vec![Command::application(0xE9), Command::mouse(2)]);
}

#[test]
fn test_text_to_binary_to_text_is_stable() {
    let t = translator();
    let cfg = TextReader::new(&t, "default")
        .with_policy(UnknownPolicy::Skip)
        .read_str(SAMPLE)
        .unwrap();

    let binary = to_bytes(&cfg).unwrap();
    let from_binary = from_bytes(&binary).unwrap();
    let text = TextWriter::new(&t, "default").write_string(&from_binary).unwrap();
    let reread = TextReader::new(&t, "default").read_str(&text).unwrap();

    assert_eq!(to_bytes(&reread).unwrap(), binary);
    assert!(text.contains("F1R = Q exclamation delay:50 haptic:1f\n"));
}

#[test]
fn test_chord_notation_round_trips_for_sampled_chords() {
    // A prime stride keeps this fast while touching every bit position.
    for bits in (1u32..(1 << 20)).step_by(4093) {
        let chord = Chord::from_bits(bits);
        assert_eq!(chord_from_text(&chord_to_text(&chord)), chord, "bits {bits:#x}");
    }
}

#[test]
fn test_layout_controls_key_resolution() {
    let t = translator();
    let text = "[mappings]\nF0R = y\n";

    let us = TextReader::new(&t, "en_US").read_str(text).unwrap();
    let de = TextReader::new(&t, "de_DE").read_str(text).unwrap();

    assert_eq!(us.mappings[0].commands, vec![Command::key(0x1C, 0)]);
    assert_eq!(de.mappings[0].commands, vec![Command::key(0x1D, 0)]);
}

#[test]
fn test_unknown_layout_is_rejected_by_reader_and_writer() {
    let t = translator();

    let read = TextReader::new(&t, "xx_YY").read_str("").unwrap_err();
    let write = TextWriter::new(&t, "xx_YY").write_string(&Config::default()).unwrap_err();

    assert!(matches!(read, ConfigError::LayoutNotFound(ref l) if l == "xx_YY"));
    assert!(matches!(write, ConfigError::LayoutNotFound(_)));
}
