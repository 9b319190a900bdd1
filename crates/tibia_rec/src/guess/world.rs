//! Guessing the game world a recording was made on

use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::strings::strings;
use crate::recording::Frame;

/// Strings shorter than this are not considered
const MIN_STRING_LEN: usize = 4;

/// Bonus for a name following a locative preposition, e.g. "Welcome to the world of Antica"
const LOCATIVE_BONUS: u32 = 10;

const LOCATIVES: [&str; 3] = ["of ", "in ", "de "];

/// A world name that is also part of common spell words
const SPELL_WORLD: &str = "vita";

const SPELLS: [&str; 3] = ["exura vita", "utamo vita", "adori vita vis"];

#[rustfmt::skip]
const ACTIVE_WORLDS: &[&str] = &[
    "Ambra", "Antica", "Astera", "Axera", "Belobra", "Bombra",
    "Bona", "Calmera", "Castela", "Celebra", "Celesta", "Collabra",
    "Damora", "Descubra", "Epoca", "Esmera", "Etebra", "Ferobra",
    "Firmera", "Flamera", "Gentebra", "Gladera", "Gravitera", "Guerribra",
    "Harmonia", "Havera", "Honbra", "Impulsa", "Inabra", "Issobra",
    "Jacabra", "Jadebra", "Jaguna", "Kalibra", "Kardera", "Kendria",
    "Lobera", "Luminera", "Lutabra", "Menera", "Monza", "Mykera",
    "Nadora", "Nefera", "Nevia", "Obscubra", "Oceanis", "Ombra",
    "Ousabra", "Pacera", "Peloria", "Premia", "Pulsera", "Quelibra",
    "Quintera", "Rasteibra", "Refugia", "Retalia", "Runera", "Secura",
    "Serdebra", "Solidera", "Stralis", "Syrena", "Talera", "Thyria",
    "Tornabra", "Ulera", "Unebra", "Ustebra", "Utobra", "Vandera",
    "Venebra", "Victoris", "Vitera", "Vunira", "Wadira", "Wildera",
    "Wintera", "Yara", "Yonabra", "Yovera", "Yubra", "Zephyra",
    "Zuna", "Zunera",
];

#[rustfmt::skip]
const RETIRED_WORLDS: &[&str] = &[
    "Adra", "Aldora", "Alumbra", "Amera", "Arcania", "Ardera",
    "Askara", "Assombra", "Aurea", "Aurera", "Aurora", "Azura",
    "Balera", "Bastia", "Batabra", "Bellona", "Belluma", "Beneva",
    "Berylia", "Cadebra", "Calva", "Calvera", "Candia", "Carnera",
    "Chimera", "Chrona", "Concorda", "Cosera", "Danera", "Danubia",
    "Dibra", "Dolera", "Duna", "Efidia", "Eldera", "Elera",
    "Elysia", "Emera", "Empera", "Estela", "Eternia", "Faluna",
    "Famosa", "Fera", "Fervora", "Fidera", "Fortera", "Funera",
    "Furia", "Furora", "Galana", "Garnera", "Grimera", "Guardia",
    "Helera", "Hiberna", "Honera", "Hydera", "Illusera", "Impera",
    "Inferna", "Iona", "Iridia", "Irmada", "Isara", "Jamera",
    "Javibra", "Jonera", "Julera", "Justera", "Juva", "Karna",
    "Keltera", "Kenora", "Kronera", "Kyra", "Laudera", "Libera",
    "Libertabra", "Lucera", "Lunara", "Macabra", "Magera", "Malvera",
    "Marbera", "Marcia", "Mercera", "Mitigera", "Morgana", "Morta",
    "Mortera", "Mudabra", "Mythera", "Nebula", "Neptera", "Nerana",
    "Nexa", "Nika", "Noctera", "Nossobra", "Nova", "Obsidia",
    "Ocebra", "Ocera", "Olera", "Olima", "Olympa", "Optera",
    "Osera", "Pacembra", "Pandoria", "Panthebra", "Panthena", "Panthera",
    "Pyra", "Pythera", "Quilia", "Ragna", "Reinobra", "Relania",
    "Relembra", "Rowana", "Rubera", "Samera", "Saphira", "Seanera",
    "Selena", "Serenebra", "Shanera", "Shivera", "Silvera", "Solera",
    "Suna", "Tavara", "Tembra", "Tenebra", "Thera", "Thoria",
    "Titania", "Torpera", "Tortura", "Trimera", "Trona", "Umera",
    "Unica", "Unisera", "Unitera", "Valoria", "Veludera", "Verlana",
    "Versa", "Vinera", "Visabra", "Vita", "Wizera", "Xandebra",
    "Xantera", "Xerena", "Xylana", "Xylona", "Yanara", "Ysolera",
    "Zanera", "Zeluna", "Zenobra",
];

/// The world names that can be guessed
///
/// "Dia" is left out of the defaults since it matches far too many unrelated strings.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct WorldList {
    names: Vec<String>,
}

impl Default for WorldList {
    fn default() -> Self {
        Self::new(ACTIVE_WORLDS.iter().chain(RETIRED_WORLDS).copied())
    }
}

impl WorldList {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Read a JSON array of world names
    #[cfg(feature = "serde")]
    pub fn from_json(reader: impl std::io::Read) -> crate::error::Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Score every world mentioned in the strings of `frames`
///
/// Each string mentioning a world scores one point, plus [`LOCATIVE_BONUS`] when the name follows
/// "of", "in" or "de". Worlds appear in the order they were first mentioned.
pub fn score_worlds<'w>(frames: &[Frame], worlds: &'w WorldList) -> IndexMap<&'w str, u32> {
    let lowered: Vec<(&str, String)> = worlds
        .names()
        .iter()
        .map(|name| (name.as_str(), name.to_lowercase()))
        .collect();

    let mut scores = IndexMap::new();
    for string in strings(frames, MIN_STRING_LEN) {
        let string = string.to_lowercase();
        for (name, world) in &lowered {
            if !string.contains(world.as_str()) {
                continue;
            }

            if world == SPELL_WORLD && SPELLS.iter().any(|spell| string.contains(spell)) {
                continue;
            }

            let mut points = 1;
            if LOCATIVES
                .iter()
                .any(|locative| string.contains(&format!("{locative}{world}")))
            {
                points += LOCATIVE_BONUS;
            }

            trace!(world = name, string = %string, points, "world mentioned");
            *scores.entry(*name).or_insert(0) += points;
        }
    }

    scores
}

/// The highest scoring world, the one mentioned first on a tie
pub fn infer_world<'w>(frames: &[Frame], worlds: &'w WorldList) -> Option<&'w str> {
    score_worlds(frames, worlds)
        .into_iter()
        .rev()
        .max_by_key(|(_, score)| *score)
        .map(|(name, _)| name)
}
