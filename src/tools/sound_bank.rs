use crate::config::SoundSource;
use crate::note::Note;
use gloo::events::EventListener;
use js_sys::Promise;
use std::collections::HashMap;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;
use yew::Callback;

/// 음원 하나의 로딩 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipLoad {
    Ready,
    Failed,
}

/// 음원 로딩 진행 상황. 실패한 음원도 "불러옴"으로 셈
#[derive(Debug, Clone, PartialEq)]
pub struct LoadProgress {
    total: usize,
    settled: Vec<Note>,
}

impl LoadProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            settled: Vec::with_capacity(total),
        }
    }

    pub fn loaded(&self) -> usize {
        self.settled.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn percent(&self) -> usize {
        if self.total == 0 {
            return 100;
        }
        (200 * self.loaded() + self.total) / (2 * self.total)
    }

    pub fn is_complete(&self) -> bool {
        self.loaded() >= self.total
    }

    /// 음원 하나를 완료 처리. 같은 음이 다시 오면 false
    pub fn mark_settled(&mut self, note: Note) -> bool {
        // canplaythrough는 여러 번 발생할 수 있음
        if self.settled.contains(&note) || self.is_complete() {
            return false;
        }
        self.settled.push(note);
        true
    }

    pub fn status_text(&self) -> String {
        if self.is_complete() {
            "모든 소리를 불러왔습니다 ✓".to_string()
        } else {
            format!(
                "소리 불러오는 중 {}/{} ({}%)",
                self.loaded(),
                self.total,
                self.percent()
            )
        }
    }
}

/// 음마다 하나씩 미리 불러둔 오디오 요소
pub struct SoundBank {
    clips: HashMap<Note, HtmlAudioElement>,
    progress: LoadProgress,
    _listeners: Vec<EventListener>,
}

impl SoundBank {
    pub fn preload(
        notes: &[Note],
        sounds: &SoundSource,
        on_settled: Callback<(Note, ClipLoad)>,
    ) -> Self {
        let mut clips = HashMap::new();
        let mut listeners = Vec::with_capacity(notes.len() * 2);

        for &note in notes {
            let path = sounds.path(&note);
            let audio = match HtmlAudioElement::new_with_src(&path) {
                Ok(audio) => audio,
                Err(err) => {
                    log::warn!("오디오 요소 생성 실패 {}: {:?}", path, err);
                    on_settled.emit((note, ClipLoad::Failed));
                    continue;
                }
            };
            audio.set_preload("auto");

            let ready = on_settled.clone();
            listeners.push(EventListener::new(&audio, "canplaythrough", move |_| {
                ready.emit((note, ClipLoad::Ready));
            }));

            let failed = on_settled.clone();
            listeners.push(EventListener::new(&audio, "error", move |_| {
                log::warn!("음원을 불러오지 못했습니다: {}", path);
                failed.emit((note, ClipLoad::Failed));
            }));

            clips.insert(note, audio);
        }

        log::info!("음원 {}개 로딩 시작", notes.len());

        Self {
            clips,
            progress: LoadProgress::new(notes.len()),
            _listeners: listeners,
        }
    }

    pub fn progress(&self) -> &LoadProgress {
        &self.progress
    }

    pub fn settle(&mut self, note: Note) -> bool {
        self.progress.mark_settled(note)
    }

    /// 처음부터 다시 재생. 이미 재생 중이면 끊고 다시 시작
    pub fn play(&self, note: &Note) {
        let Some(clip) = self.clips.get(note) else {
            log::debug!("{}에 해당하는 음원이 없습니다", note);
            return;
        };

        clip.set_current_time(0.0);
        match clip.play() {
            Ok(promise) => wasm_bindgen_futures::spawn_local(watch_playback(*note, promise)),
            Err(err) => log::warn!("오디오 재생 실패 {}: {:?}", note, err),
        }
    }
}

// 자동 재생 정책으로 막힌 경우도 여기서 로그만 남김
async fn watch_playback(note: Note, promise: Promise) {
    if let Err(err) = JsFuture::from(promise).await {
        log::warn!(
            "오디오 재생 실패 {}: {:?} (페이지를 한 번 클릭하면 소리가 켜집니다)",
            note,
            err
        );
    }
}
