//! Property tests for the bitfield codec

use busmap_spec::{bitfield, Access, Field, Ident};
use proptest::prelude::*;

fn arb_field() -> impl Strategy<Value = Field> {
    // Fields up to 24 bits wide anywhere in a 4-byte register.
    (0u16..32, 1u8..=24).prop_filter_map("field must fit in 4 bytes", |(lsb, width)| {
        if lsb + width as u16 <= 32 {
            Some(Field {
                name: Ident::new("f"),
                lsb,
                width,
                access: Access::ReadWrite,
                default: None,
                aliased: false,
            })
        } else {
            None
        }
    })
}

fn apply_patches(field: &Field, value: u64, bytes: &mut [u8]) {
    for patch in bitfield::encode(field, value).unwrap() {
        let b = &mut bytes[patch.byte as usize];
        *b = (*b & !patch.mask) | ((patch.value << patch.shift) & patch.mask);
    }
}

proptest! {
    /// decode(apply(encode(f, v))) == v for every legal value.
    #[test]
    fn round_trip_is_exact(field in arb_field(), seed in any::<u64>()) {
        let value = seed & bitfield::max_value(field.width);
        let mut bytes = [0u8; 4];
        apply_patches(&field, value, &mut bytes);
        prop_assert_eq!(bitfield::decode(&field, &bytes), value);
    }

    /// Bits outside the field's masks are never modified, whatever the
    /// starting image.
    #[test]
    fn encode_preserves_unrelated_bits(
        field in arb_field(),
        seed in any::<u64>(),
        background in any::<[u8; 4]>(),
    ) {
        let value = seed & bitfield::max_value(field.width);
        let mut bytes = background;
        apply_patches(&field, value, &mut bytes);

        let mut covered = [0u8; 4];
        for span in bitfield::spans(&field) {
            covered[span.byte as usize] |= span.mask;
        }
        for i in 0..4 {
            prop_assert_eq!(bytes[i] & !covered[i], background[i] & !covered[i]);
        }
    }

    /// Encoding an oversized value is always a range error.
    #[test]
    fn oversized_values_rejected(field in arb_field(), extra in 1u64..1000) {
        prop_assume!(field.width < 63);
        let value = bitfield::max_value(field.width) + extra;
        prop_assert!(bitfield::encode(&field, value).is_err());
    }
}
