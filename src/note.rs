use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 음 이름 (C ~ B, 올림/내림 없음)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoteName {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteName {
    pub const ALL: [NoteName; 7] = [
        NoteName::C,
        NoteName::D,
        NoteName::E,
        NoteName::F,
        NoteName::G,
        NoteName::A,
        NoteName::B,
    ];

    // 화면 표시용 대문자
    pub fn letter(self) -> char {
        match self {
            NoteName::C => 'C',
            NoteName::D => 'D',
            NoteName::E => 'E',
            NoteName::F => 'F',
            NoteName::G => 'G',
            NoteName::A => 'A',
            NoteName::B => 'B',
        }
    }

    fn from_letter(letter: char) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|name| name.letter() == letter.to_ascii_uppercase())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NoteParseError {
    #[error("음 ID가 비어 있습니다")]
    Empty,
    #[error("알 수 없는 음 이름: '{0}'")]
    UnknownName(char),
    #[error("옥타브는 한 자리 숫자여야 합니다: '{0}'")]
    InvalidOctave(String),
}

/// 옥타브를 포함한 음. ID는 소문자 음 이름 + 옥타브 한 자리 (예: "c4")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    name: NoteName,
    octave: u8,
}

impl Note {
    pub const MAX_OCTAVE: u8 = 9;

    pub fn new(name: NoteName, octave: u8) -> Result<Self, NoteParseError> {
        if octave > Self::MAX_OCTAVE {
            return Err(NoteParseError::InvalidOctave(octave.to_string()));
        }
        Ok(Self { name, octave })
    }

    pub fn name(&self) -> NoteName {
        self.name
    }

    pub fn octave(&self) -> u8 {
        self.octave
    }

    /// 정규화된 음 ID (예: "c4")
    pub fn id(&self) -> String {
        self.to_string()
    }

    /// 화면에 표시할 이름 (예: "C4")
    pub fn label(&self) -> String {
        format!("{}{}", self.name.letter(), self.octave)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name.letter().to_ascii_lowercase(), self.octave)
    }
}

impl FromStr for Note {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        let letter = chars.next().ok_or(NoteParseError::Empty)?;
        let name = NoteName::from_letter(letter).ok_or(NoteParseError::UnknownName(letter))?;

        let rest = chars.as_str();
        let mut digits = rest.chars();
        match (digits.next().and_then(|d| d.to_digit(10)), digits.next()) {
            (Some(octave), None) => Note::new(name, octave as u8),
            _ => Err(NoteParseError::InvalidOctave(rest.to_string())),
        }
    }
}

impl TryFrom<String> for Note {
    type Error = NoteParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.id()
    }
}
