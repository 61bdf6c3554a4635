// SPDX-License-Identifier: MIT

pub fn strip_0x(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Canonicalize a ledger asset type tag (`0xADDR::module::Name`).
///
/// The same asset can be written with a short or zero-padded address and
/// mixed hex casing; comparing raw strings then yields false "no route"
/// results. The address part is lowercased and left-padded to 64 hex
/// characters; module and struct names are preserved verbatim.
pub fn normalize_asset_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let (addr, rest) = trimmed.split_once("::")?;
    if rest.is_empty() || !rest.contains("::") {
        return None;
    }
    let hex_part = strip_0x(addr).to_ascii_lowercase();
    if hex_part.is_empty()
        || hex_part.len() > 64
        || !hex_part.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    Some(format!("0x{:0>64}::{}", hex_part, rest))
}

/// Canonicalize a bare account/object address.
pub fn normalize_address(raw: &str) -> Option<String> {
    let hex_part = strip_0x(raw.trim()).to_ascii_lowercase();
    if hex_part.is_empty()
        || hex_part.len() > 64
        || !hex_part.bytes().all(|b| b.is_ascii_hexdigit())
    {
        return None;
    }
    Some(format!("0x{:0>64}", hex_part))
}

pub fn parse_u64_amount(raw: &str) -> Option<u64> {
    raw.trim().parse::<u64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_and_padded_tags_normalize_identically() {
        let short = normalize_asset_tag("0x2::sui::SUI").unwrap();
        let padded = normalize_asset_tag(&format!("0x{:0>64}::sui::SUI", "2")).unwrap();
        assert_eq!(short, padded);
        assert!(short.starts_with("0x"));
        assert_eq!(short.split("::").next().unwrap().len(), 66);
    }

    #[test]
    fn address_casing_is_folded() {
        let upper = normalize_asset_tag("0xAB12::coin::COIN").unwrap();
        let lower = normalize_asset_tag("0xab12::coin::COIN").unwrap();
        assert_eq!(upper, lower);
        // Struct name casing is meaningful and must survive.
        assert!(upper.ends_with("::coin::COIN"));
    }

    #[test]
    fn malformed_tags_are_rejected() {
        assert!(normalize_asset_tag("not a tag").is_none());
        assert!(normalize_asset_tag("0x2::sui").is_none());
        assert!(normalize_asset_tag("0xzz::a::B").is_none());
        assert!(normalize_asset_tag("").is_none());
    }

    #[test]
    fn addresses_normalize() {
        let a = normalize_address("0x0").unwrap();
        assert_eq!(a.len(), 66);
        assert!(normalize_address("0xq").is_none());
    }
}
