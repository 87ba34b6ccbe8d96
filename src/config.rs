use crate::keymap::{KeyBindings, KeyboardLayout, Side, RESERVED_KEYS};
use crate::note::Note;
use crate::session::NotePool;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// 빌드 시 포함되는 기본 설정
const EMBEDDED_CONFIG: &str = include_str!("trainer.yaml");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("설정 파싱 실패: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("건반이 비어 있습니다")]
    EmptyKeyboard,
    #[error("{0} 열이 비어 있습니다")]
    EmptyColumn(&'static str),
    #[error("건반에 같은 음이 두 번 있습니다: {0}")]
    DuplicateNote(Note),
    #[error("키가 지정되지 않은 음: {0}")]
    UnboundNote(Note),
    #[error("키 {code}이(가) 건반에 없는 음 {note}에 지정되었습니다")]
    UnknownBindingTarget { code: String, note: Note },
    #[error("예약된 키는 음에 지정할 수 없습니다: {0}")]
    ReservedKey(String),
}

/// 지연 시간 (밀리초)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub highlight_ms: u32,
    pub next_target_delay_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            highlight_ms: 150,
            next_target_delay_ms: 300,
        }
    }
}

/// 음원 파일 위치 규칙: <dir>/<음 ID>.<extension>
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundSource {
    pub dir: String,
    pub extension: String,
}

impl Default for SoundSource {
    fn default() -> Self {
        Self {
            dir: "sounds".to_string(),
            extension: "mp3".to_string(),
        }
    }
}

impl SoundSource {
    pub fn path(&self, note: &Note) -> String {
        format!(
            "{}/{}.{}",
            self.dir.trim_end_matches('/'),
            note.id(),
            self.extension.trim_start_matches('.')
        )
    }
}

/// 트레이너 전체 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainerConfig {
    #[serde(default)]
    pub timing: Timing,
    #[serde(default)]
    pub sounds: SoundSource,
    pub layout: KeyboardLayout,
    pub bindings: KeyBindings,
}

impl TrainerConfig {
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_yaml(EMBEDDED_CONFIG)
    }

    pub fn from_yaml(source: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// 목표 음 후보 (두 열 전체)
    pub fn note_pool(&self) -> Result<NotePool, ConfigError> {
        NotePool::new(self.layout.pool()).ok_or(ConfigError::EmptyKeyboard)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for side in [Side::Left, Side::Right] {
            if self.layout.column(side).is_empty() {
                return Err(ConfigError::EmptyColumn(side.as_str()));
            }
        }

        let mut seen: Vec<Note> = Vec::new();
        for (_, note) in self.layout.keys() {
            if seen.contains(&note) {
                return Err(ConfigError::DuplicateNote(note));
            }
            seen.push(note);
        }

        for (code, note) in self.bindings.iter() {
            if RESERVED_KEYS.contains(&code) {
                return Err(ConfigError::ReservedKey(code.to_string()));
            }
            if !self.layout.contains(&note) {
                return Err(ConfigError::UnknownBindingTarget {
                    code: code.to_string(),
                    note,
                });
            }
        }

        // 모든 건반은 물리 키로도 누를 수 있어야 함
        if let Some(note) = seen
            .into_iter()
            .find(|note| self.bindings.code_for(note).is_none())
        {
            return Err(ConfigError::UnboundNote(note));
        }

        Ok(())
    }
}
