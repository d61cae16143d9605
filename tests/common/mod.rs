#![allow(dead_code)]

/// `[size][type][payload]` with a 32-bit size.
pub fn atom(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((payload.len() + 8) as u32).to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(payload);
    v
}

/// Same as [`atom`] with a 64-bit extended size.
pub fn large_atom(typ: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&1u32.to_be_bytes());
    v.extend_from_slice(typ);
    v.extend_from_slice(&((payload.len() + 16) as u64).to_be_bytes());
    v.extend_from_slice(payload);
    v
}

/// A `meta` atom. The 32-bit size covers the base header and the children; the 4 version/flags
/// bytes come on top of it, as the walker accounts them.
pub fn meta(children: &[u8]) -> Vec<u8> {
    let mut v = Vec::new();
    v.extend_from_slice(&((children.len() + 8) as u32).to_be_bytes());
    v.extend_from_slice(b"meta");
    v.extend_from_slice(&[0, 0, 0, 0]);
    v.extend_from_slice(children);
    v
}

/// An iTunes item atom wrapping a single `data` atom.
pub fn item(typ: &[u8; 4], value: &[u8]) -> Vec<u8> {
    let mut payload = vec![0, 0, 0, 1, 0, 0, 0, 0]; // type indicator + locale
    payload.extend_from_slice(value);
    atom(typ, &atom(b"data", &payload))
}

pub fn concat(parts: &[Vec<u8>]) -> Vec<u8> {
    parts.concat()
}
