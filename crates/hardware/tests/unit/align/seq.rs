//! # Sequence Encoding Tests

use blastn_xcel_core::align::seq::{decode_base, encode_base};
use blastn_xcel_core::align::{decode, encode, pack, unpack};
use blastn_xcel_core::common::ExtendError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn encode_accepts_both_cases() {
    assert_eq!(encode("ACGTacgt").unwrap(), vec![0, 1, 2, 3, 0, 1, 2, 3]);
    assert_eq!(encode("").unwrap(), Vec::<u8>::new());
}

#[test]
fn encode_rejects_other_characters() {
    assert_eq!(encode("ACGN"), Err(ExtendError::InvalidBase('N')));
    assert_eq!(encode("AC GT"), Err(ExtendError::InvalidBase(' ')));
    assert_eq!(encode_base('u'), None);
}

#[test]
fn decode_is_upper_case() {
    assert_eq!(decode(&[3, 2, 1, 0]), "TGCA");
    assert_eq!(decode_base(7), 'T');
}

#[test]
fn pack_places_first_symbol_low() {
    assert_eq!(pack(&[1]), 1);
    assert_eq!(pack(&[0, 1, 2, 3]), 0xE4);
    assert_eq!(pack(&[3; 16]), u32::MAX);
}

#[test]
fn pack_ignores_symbols_past_sixteen() {
    let mut symbols = vec![0; 16];
    symbols.push(3);
    assert_eq!(pack(&symbols), 0);
}

#[test]
fn unpack_fills_sixteen() {
    let symbols = unpack(0xE4);
    assert_eq!(&symbols[..4], &[0, 1, 2, 3]);
    assert!(symbols[4..].iter().all(|&s| s == 0));
}

proptest! {
    #[test]
    fn pack_unpack_word(word in any::<u32>()) {
        prop_assert_eq!(pack(&unpack(word)), word);
    }

    #[test]
    fn text_survives_encoding(seq in "[ACGT]{0,40}") {
        prop_assert_eq!(decode(&encode(&seq).unwrap()), seq);
    }
}
