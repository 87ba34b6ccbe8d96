use crate::note::Note;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// 예약 단축키 (KeyboardEvent.code 기준)
pub const NEW_TARGET_KEY: &str = "Space";
pub const TOGGLE_NAMES_KEY: &str = "KeyH"; // Ctrl과 함께 눌러야 함
pub const DUMP_STATE_KEY: &str = "Backquote";

/// 음 키에 바인딩할 수 없는 키
pub const RESERVED_KEYS: [&str; 2] = [NEW_TARGET_KEY, DUMP_STATE_KEY];

/// 건반 열 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// 두 열로 구성된 건반 배치
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyboardLayout {
    pub left: Vec<Note>,
    pub right: Vec<Note>,
}

impl KeyboardLayout {
    pub fn column(&self, side: Side) -> &[Note] {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// 왼쪽 열 다음 오른쪽 열 순서로 모든 건반
    pub fn keys(&self) -> impl Iterator<Item = (Side, Note)> + '_ {
        self.left
            .iter()
            .map(|note| (Side::Left, *note))
            .chain(self.right.iter().map(|note| (Side::Right, *note)))
    }

    /// 목표 음 후보 (두 열 전체)
    pub fn pool(&self) -> Vec<Note> {
        self.keys().map(|(_, note)| note).collect()
    }

    /// 중복을 제거한 음 목록, 처음 등장한 순서 유지
    pub fn unique_notes(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = Vec::new();
        for (_, note) in self.keys() {
            if !notes.contains(&note) {
                notes.push(note);
            }
        }
        notes
    }

    pub fn contains(&self, note: &Note) -> bool {
        self.left.contains(note) || self.right.contains(note)
    }
}

/// 키보드 수정자 상태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    fn any(&self) -> bool {
        self.ctrl || self.alt || self.meta
    }
}

/// 물리 키 입력을 해석한 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Play(Note),
    NewTarget,
    ToggleNames,
    DumpState,
}

/// keydown 이벤트 처리 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDecision {
    /// 처리하지 않는 키, 브라우저 기본 동작 유지
    Pass,
    /// 기본 동작만 막고 아무것도 하지 않음 (자동 반복)
    Suppress,
    /// 기본 동작을 막고 실행
    Act(KeyAction),
}

impl KeyDecision {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, KeyDecision::Pass)
    }
}

/// 물리 키 코드 -> 음
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings(BTreeMap<String, Note>);

impl KeyBindings {
    pub fn note_for(&self, code: &str) -> Option<Note> {
        self.0.get(code).copied()
    }

    pub fn code_for(&self, note: &Note) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, bound)| *bound == note)
            .map(|(code, _)| code.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Note)> {
        self.0.iter().map(|(code, note)| (code.as_str(), *note))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// keydown 이벤트 하나를 동작으로 해석
    pub fn resolve(&self, code: &str, modifiers: Modifiers) -> Option<KeyAction> {
        if code == TOGGLE_NAMES_KEY && modifiers.ctrl && !modifiers.alt && !modifiers.meta {
            return Some(KeyAction::ToggleNames);
        }
        // 나머지 조합키는 브라우저 단축키로 남겨둠
        if modifiers.any() {
            return None;
        }

        if let Some(note) = self.note_for(code) {
            return Some(KeyAction::Play(note));
        }
        match code {
            NEW_TARGET_KEY => Some(KeyAction::NewTarget),
            DUMP_STATE_KEY => Some(KeyAction::DumpState),
            _ => None,
        }
    }

    /// 자동 반복 여부까지 포함해 keydown 이벤트를 판정
    pub fn decide(&self, code: &str, modifiers: Modifiers, repeat: bool) -> KeyDecision {
        match self.resolve(code, modifiers) {
            None => KeyDecision::Pass,
            // 누르고 있는 동안의 반복 입력은 점수에 넣지 않음
            Some(_) if repeat => KeyDecision::Suppress,
            Some(action) => KeyDecision::Act(action),
        }
    }
}

impl FromIterator<(String, Note)> for KeyBindings {
    fn from_iter<T: IntoIterator<Item = (String, Note)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// 건반 위에 표시할 물리 키 이름 (예: "KeyZ" -> "Z")
pub fn key_label(code: &str) -> String {
    if let Some(letter) = code.strip_prefix("Key") {
        return letter.to_string();
    }
    if let Some(digit) = code.strip_prefix("Digit") {
        return digit.to_string();
    }
    let symbol = match code {
        "Semicolon" => ";",
        "Quote" => "'",
        "Comma" => ",",
        "Period" => ".",
        "Slash" => "/",
        "Backslash" => "\\",
        "BracketLeft" => "[",
        "BracketRight" => "]",
        "Minus" => "-",
        "Equal" => "=",
        "Backquote" => "`",
        other => other,
    };
    symbol.to_string()
}
