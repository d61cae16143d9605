use crate::atom::walk;
use crate::boxes::FourCC;
use crate::parser::{ParseError, Result};
use crate::util::Source;
use byteorder::{BigEndian, ReadBytesExt};
use serde::Serialize;
use std::io::{Cursor, Read};

/// Unsigned 16.16 fixed point number, as used for track dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FixedFloat32 {
    pub integer: u16,
    pub fraction: u16,
}

impl FixedFloat32 {
    pub fn from_bits(bits: u32) -> Self {
        FixedFloat32 { integer: (bits >> 16) as u16, fraction: bits as u16 }
    }

    pub fn to_f32(self) -> f32 {
        f32::from(self.integer) + f32::from(self.fraction) / 65536.0
    }
}

/// Movie header (`moov.mvhd`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mvhd {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64, // seconds since 1904
    pub modification_time: u64,
    pub timescale: u32,
    pub duration: u64,
}

// Payload needed up to and including the duration.
const MVHD_V0_LEN: usize = 20;
const MVHD_V1_LEN: usize = 32;

// Payload needed up to and including the track height.
const TKHD_V0_LEN: usize = 84;
const TKHD_V1_LEN: usize = 96;

fn read_version_flags(cur: &mut Cursor<&[u8]>) -> Result<(u8, u32)> {
    let version = cur.read_u8()?;
    let flags = cur.read_u24::<BigEndian>()?;
    Ok((version, flags))
}

fn check_len(typ: &[u8; 4], data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(ParseError::MetadataSize {
            typ: FourCC(*typ),
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

impl Mvhd {
    /// Decodes an `mvhd` payload (everything after the atom header).
    pub fn parse(data: &[u8]) -> Result<Self> {
        check_len(b"mvhd", data, MVHD_V0_LEN)?;
        let mut cur = Cursor::new(data);
        let (version, flags) = read_version_flags(&mut cur)?;

        let mvhd = if version == 1 {
            check_len(b"mvhd", data, MVHD_V1_LEN)?;
            Mvhd {
                version,
                flags,
                creation_time: cur.read_u64::<BigEndian>()?,
                modification_time: cur.read_u64::<BigEndian>()?,
                timescale: cur.read_u32::<BigEndian>()?,
                duration: cur.read_u64::<BigEndian>()?,
            }
        } else {
            Mvhd {
                version,
                flags,
                creation_time: u64::from(cur.read_u32::<BigEndian>()?),
                modification_time: u64::from(cur.read_u32::<BigEndian>()?),
                timescale: cur.read_u32::<BigEndian>()?,
                duration: u64::from(cur.read_u32::<BigEndian>()?),
            }
        };
        Ok(mvhd)
    }

    /// Finds and decodes the movie header of `source`.
    pub fn read<S: Source>(source: S) -> Result<Option<Self>> {
        let mut found = None;
        walk(source, |_, a| {
            if a.is(b"mvhd") {
                let mut data = Vec::new();
                a.read_to_end(&mut data)?;
                let mvhd = Mvhd::parse(&data)?;
                log::info!("mvhd duration {:.3}s", mvhd.duration_seconds().unwrap_or(0.0));
                found = Some(mvhd);
            }
            Ok(())
        })?;
        Ok(found)
    }

    /// `None` when the timescale is zero.
    pub fn duration_seconds(&self) -> Option<f64> {
        (self.timescale != 0).then(|| self.duration as f64 / f64::from(self.timescale))
    }
}

/// Track header (`moov.trak.tkhd`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tkhd {
    pub version: u8,
    pub flags: u32,
    pub creation_time: u64, // seconds since 1904
    pub modification_time: u64,
    pub track_id: u32,
    pub duration: u64,
    pub layer: i16,
    pub alternate_group: i16,
    pub volume: u16, // 8.8 fixed point
    pub matrix: [i32; 9],
    pub width: FixedFloat32,
    pub height: FixedFloat32,
}

impl Tkhd {
    /// Decodes a `tkhd` payload (everything after the atom header).
    pub fn parse(data: &[u8]) -> Result<Self> {
        check_len(b"tkhd", data, TKHD_V0_LEN)?;
        let mut cur = Cursor::new(data);
        let (version, flags) = read_version_flags(&mut cur)?;

        let mut tkhd = Tkhd { version, flags, ..Default::default() };
        if version == 1 {
            check_len(b"tkhd", data, TKHD_V1_LEN)?;
            tkhd.creation_time = cur.read_u64::<BigEndian>()?;
            tkhd.modification_time = cur.read_u64::<BigEndian>()?;
            tkhd.track_id = cur.read_u32::<BigEndian>()?;
            let _reserved = cur.read_u32::<BigEndian>()?;
            tkhd.duration = cur.read_u64::<BigEndian>()?;
        } else {
            tkhd.creation_time = u64::from(cur.read_u32::<BigEndian>()?);
            tkhd.modification_time = u64::from(cur.read_u32::<BigEndian>()?);
            tkhd.track_id = cur.read_u32::<BigEndian>()?;
            let _reserved = cur.read_u32::<BigEndian>()?;
            tkhd.duration = u64::from(cur.read_u32::<BigEndian>()?);
        }

        let _reserved = cur.read_u64::<BigEndian>()?;
        tkhd.layer = cur.read_i16::<BigEndian>()?;
        tkhd.alternate_group = cur.read_i16::<BigEndian>()?;
        tkhd.volume = cur.read_u16::<BigEndian>()?;
        let _reserved = cur.read_u16::<BigEndian>()?;
        for m in tkhd.matrix.iter_mut() {
            *m = cur.read_i32::<BigEndian>()?;
        }
        tkhd.width = FixedFloat32::from_bits(cur.read_u32::<BigEndian>()?);
        tkhd.height = FixedFloat32::from_bits(cur.read_u32::<BigEndian>()?);
        Ok(tkhd)
    }

    /// Decodes the header of every track of `source`, in file order.
    pub fn read_all<S: Source>(source: S) -> Result<Vec<Self>> {
        let mut tracks = Vec::new();
        walk(source, |ancestors, a| {
            if a.is(b"tkhd") && ancestors.last().is_some_and(|p| p.typ == FourCC(*b"trak")) {
                let mut data = Vec::new();
                a.read_to_end(&mut data)?;
                tracks.push(Tkhd::parse(&data)?);
            }
            Ok(())
        })?;
        Ok(tracks)
    }

    /// Decodes the first track header of `source`. Later tracks are skipped unread.
    pub fn read<S: Source>(source: S) -> Result<Option<Self>> {
        let mut found = None;
        walk(source, |_, a| {
            if found.is_some() {
                if a.is(b"trak") {
                    a.skip = true;
                }
                return Ok(());
            }
            if a.is(b"tkhd") {
                let mut data = Vec::new();
                a.read_to_end(&mut data)?;
                found = Some(Tkhd::parse(&data)?);
            }
            Ok(())
        })?;
        Ok(found)
    }
}
