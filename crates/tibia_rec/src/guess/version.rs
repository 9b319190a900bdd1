//! Guessing the client version from the login notice
//!
//! When logging in, the server greets the player with a message like
//! `Your last visit in Tibia: 9. Aug 2005`. The date is the day of the recording, which is then
//! located in a table of client release dates.

use std::{collections::BTreeMap, str::FromStr};

use chrono::{Month, NaiveDate};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use winnow::{
    ascii::digit1,
    prelude::*,
    token::{take, take_while},
};

use crate::recording::{Frame, Recording};

/// Opcode of a text message
const TEXT_MESSAGE: u8 = 0xB4;

/// Message classes used for the login notice across client generations
const NOTICE_CLASSES: [u8; 4] = [0x11, 0x13, 0x14, 0x16];

const MAX_NOTICE_LEN: usize = 255;

/// The login notice is sent right after entering the game
const SCANNED_FRAMES: usize = 10;

const NOTICE_PREFIX: &str = "Your last visit in Tibia: ";

/// The first day a client version could be used
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Milestone {
    pub released: NaiveDate,
    pub version: u16,
}

#[rustfmt::skip]
const MILESTONES: [(i32, u32, u32, u16); 54] = [
    (2002,  8, 28, 700), (2002, 10, 22, 701), (2002, 11, 21, 702), (2002, 12, 17, 710),
    (2003,  7, 27, 711), (2003, 12, 16, 720), (2004,  1, 21, 721), (2004,  3,  9, 723),
    (2004,  3, 14, 724), (2004,  5,  4, 726), (2004,  7, 22, 727), (2004,  8, 11, 730),
    (2004, 12, 10, 735), (2004, 12, 14, 740), (2005,  7,  7, 741), (2005,  8,  9, 750),
    (2005, 11, 16, 755), (2005, 12, 12, 760), (2006,  5,  5, 761), (2006,  5, 17, 770),
    (2006,  5, 31, 771), (2006,  6,  8, 772), (2006,  8,  1, 780), (2006,  8, 29, 781),
    (2006, 10, 13, 782), (2006, 12, 12, 790), (2007,  1,  8, 792), (2007,  6, 26, 800),
    (2007, 12, 11, 810), (2008,  4,  8, 811), (2008,  7,  2, 820), (2008,  7, 24, 821),
    (2008,  8, 12, 822), (2008,  9, 30, 830), (2008, 10,  1, 831), (2008, 12, 10, 840),
    (2009,  3, 18, 841), (2009,  4, 22, 842), (2009,  7,  1, 850), (2009, 10,  1, 852),
    (2009, 11,  5, 853), (2009, 12,  9, 854), (2010,  3, 17, 855), (2010,  5,  5, 856),
    (2010,  5,  6, 857), (2010,  6, 30, 860), (2010,  8, 23, 861), (2010,  9, 22, 862),
    (2010, 12,  8, 870), (2011,  1, 27, 871), (2011,  4, 20, 872), (2011,  4,  4, 873),
    (2011,  4, 12, 874), (2011,  6,  9, 900),
];

/// Versions that can be replaced by a sibling without any difference in playback
const ALIASES: [(u16, u16); 4] = [
    // test server clients
    (723, 724),
    (735, 740),
    (761, 770),
    // released the same day
    (851, 852),
];

/// Client release dates and version aliases
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VersionTable {
    milestones: Vec<Milestone>,
    #[cfg_attr(feature = "serde", serde(default))]
    aliases: BTreeMap<u16, u16>,
}

impl Default for VersionTable {
    fn default() -> Self {
        let milestones = MILESTONES
            .iter()
            .filter_map(|&(year, month, day, version)| {
                NaiveDate::from_ymd_opt(year, month, day)
                    .map(|released| Milestone { released, version })
            })
            .collect();

        Self::new(milestones, ALIASES.into_iter().collect())
    }
}

impl VersionTable {
    pub fn new(milestones: Vec<Milestone>, aliases: BTreeMap<u16, u16>) -> Self {
        Self {
            milestones,
            aliases,
        }
    }

    /// Read a table from JSON, e.g. `{"milestones": [{"released": "2006-06-08", "version": 772}]}`
    #[cfg(feature = "serde")]
    pub fn from_json(reader: impl std::io::Read) -> crate::error::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// The version in use on `date`
    ///
    /// Milestones are visited in table order until one is released after `date`. Dates before the
    /// first milestone have no version.
    pub fn version_at(&self, date: NaiveDate) -> Option<u16> {
        self.milestones
            .iter()
            .take_while(|milestone| milestone.released <= date)
            .last()
            .map(|milestone| self.canonical(milestone.version))
    }

    /// Replace `version` by its sibling, if it has one
    pub fn canonical(&self, version: u16) -> u16 {
        self.aliases.get(&version).copied().unwrap_or(version)
    }
}

/// Find the login notice in the first frames and look up its date
pub fn scan_version(frames: &[Frame], table: &VersionTable) -> Option<u16> {
    frames
        .iter()
        .take(SCANNED_FRAMES)
        .find_map(|frame| scan_frame(&frame.data, table))
}

fn scan_frame(data: &[u8], table: &VersionTable) -> Option<u16> {
    (0..data.len().saturating_sub(4)).find_map(|i| {
        if data[i] != TEXT_MESSAGE || !NOTICE_CLASSES.contains(&data[i + 1]) {
            return None;
        }

        let length = usize::from(u16::from_le_bytes([data[i + 2], data[i + 3]]));
        if length > MAX_NOTICE_LEN {
            return None;
        }

        let text = &data[i + 4..(i + 4 + length).min(data.len())];
        if !text.is_ascii() {
            return None;
        }

        let date = last_visit(std::str::from_utf8(text).ok()?)?;
        debug!(%date, "found login notice");
        table.version_at(date)
    })
}

/// Date of the first well formed login notice in `text`
pub fn last_visit(text: &str) -> Option<NaiveDate> {
    text.match_indices(NOTICE_PREFIX).find_map(|(start, _)| {
        let mut input = &text[start + NOTICE_PREFIX.len()..];
        let (day, month, year) = notice_date.parse_next(&mut input).ok()?;
        let month = Month::from_str(month).ok()?;
        NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
    })
}

/// `9. Aug 2005`
fn notice_date<'s>(input: &mut &'s str) -> ModalResult<(u32, &'s str, i32)> {
    let (day, _, month, _, year) = (
        digit1.parse_to::<u32>(),
        ". ",
        take(3usize),
        ' ',
        take_while(4, |c: char| c.is_ascii_digit()).parse_to::<i32>(),
    )
        .parse_next(input)?;

    Ok((day, month, year))
}

/// Assign the version found by [`scan_version`] to a recording without one
#[instrument(skip_all)]
pub fn infer_version(recording: &mut Recording, table: &VersionTable) -> Option<u16> {
    if let Some(version) = recording.version() {
        return Some(version);
    }

    let version = scan_version(recording.frames(), table)?;
    recording.assign_version(version).ok()?;
    debug!(version, "inferred version");
    Some(version)
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::{infer_version, last_visit, scan_version, VersionTable};
    use crate::recording::{Frame, Recording};

    fn notice(class: u8, text: &str) -> Frame {
        let mut data = vec![0x0A, 0x00, 0xB4, class];
        data.extend_from_slice(&(text.len() as u16).to_le_bytes());
        data.extend_from_slice(text.as_bytes());
        Frame::new(0, data)
    }

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn milestone_boundary() {
        let table = VersionTable::default();

        let frames = [notice(0x14, "Your last visit in Tibia: 9. Aug 2005.")];
        assert_eq!(scan_version(&frames, &table), Some(750));

        let frames = [notice(0x14, "Your last visit in Tibia: 8. Aug 2005.")];
        assert_eq!(scan_version(&frames, &table), Some(741));
    }

    #[test]
    fn table_lookup() {
        let table = VersionTable::default();

        assert_eq!(table.version_at(date(2002, 8, 27)), None);
        assert_eq!(table.version_at(date(2002, 8, 28)), Some(700));
        assert_eq!(table.version_at(date(2006, 6, 20)), Some(772));
        assert_eq!(table.version_at(date(2020, 1, 1)), Some(900));
    }

    #[test]
    fn test_server_clients_are_aliased() {
        let table = VersionTable::default();

        assert_eq!(table.version_at(date(2004, 3, 10)), Some(724));
        assert_eq!(table.version_at(date(2006, 5, 6)), Some(770));
        assert_eq!(table.canonical(772), 772);
    }

    #[test]
    fn parse_notice() {
        assert_eq!(
            last_visit("Welcome! Your last visit in Tibia: 17. May 2006. You have a premium account."),
            Some(date(2006, 5, 17))
        );
        assert_eq!(last_visit("Your last visit in Tibia: 31. Feb 2006."), None);
        assert_eq!(last_visit("Your last visit in Tibia: 1. Foo 2006."), None);
        assert_eq!(last_visit("Welcome to Tibia!"), None);
    }

    #[test]
    fn unknown_class_is_ignored() {
        let frames = [notice(0x15, "Your last visit in Tibia: 9. Aug 2005.")];
        assert_eq!(scan_version(&frames, &VersionTable::default()), None);
    }

    #[test]
    fn only_first_frames_are_scanned() {
        let mut frames = vec![Frame::new(0, [0x01, 0x00, 0xAA]); 10];
        frames.push(notice(0x14, "Your last visit in Tibia: 9. Aug 2005."));

        assert_eq!(scan_version(&frames, &VersionTable::default()), None);

        frames.remove(0);
        assert_eq!(scan_version(&frames, &VersionTable::default()), Some(750));
    }

    #[test]
    fn declared_version_is_kept() {
        let frames = vec![notice(0x14, "Your last visit in Tibia: 9. Aug 2005.")];
        let table = VersionTable::default();

        let mut recording = Recording::new(Some(760), frames.clone());
        assert_eq!(infer_version(&mut recording, &table), Some(760));
        assert_eq!(recording.version(), Some(760));

        let mut recording = Recording::new(None, frames);
        assert_eq!(infer_version(&mut recording, &table), Some(750));
        assert_eq!(recording.version(), Some(750));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn table_from_json() -> crate::error::Result<()> {
        let json = r#"{"milestones": [{"released": "2006-06-08", "version": 772}]}"#;
        let table = VersionTable::from_json(json.as_bytes())?;

        assert_eq!(table.version_at(date(2006, 7, 1)), Some(772));
        assert_eq!(table.version_at(date(2006, 6, 7)), None);

        Ok(())
    }
}
