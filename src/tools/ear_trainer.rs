use crate::config::{ConfigError, TrainerConfig};
use crate::dashboard::{Card, StatTile};
use crate::keymap::{key_label, KeyAction, KeyBindings, KeyDecision, Modifiers, Side};
use crate::note::Note;
use crate::session::{
    Effect, Highlights, InputSource, NoteInput, NotePool, Session, TargetToken, Verdict,
};
use crate::tools::sound_bank::{ClipLoad, SoundBank};
use gloo::events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use log::{debug, info};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::KeyboardEvent;
use yew::prelude::*;

/// 설정을 읽고 목표 음 후보를 준비
pub fn load_setup() -> Result<(Rc<TrainerConfig>, NotePool), ConfigError> {
    let config = TrainerConfig::embedded()?;
    let pool = config.note_pool()?;
    info!(
        "설정 로드 완료: 건반 {}개, 키 바인딩 {}개",
        pool.notes().len(),
        config.bindings.len()
    );
    Ok((Rc::new(config), pool))
}

#[derive(Properties, PartialEq)]
pub struct EarTrainerProps {
    pub config: Rc<TrainerConfig>,
    pub pool: NotePool,
}

// 청음 트레이너 메시지
pub enum EarTrainerMsg {
    Input(NoteInput),                // 건반 클릭 또는 키 입력
    ClearHighlight(Note, u32),       // 하이라이트 해제 (세대 번호)
    NextTargetDue(TargetToken),      // 정답 후 지연 시간 경과
    NewTarget,                       // 새 목표 음 강제 선택
    Reset,                           // 통계 초기화
    ToggleNames,                     // 음 이름 표시 토글
    DumpState,                       // 상태를 로그로 출력
    ClipSettled(Note, ClipLoad),     // 음원 로딩 완료 또는 실패
}

// 청음 트레이너 컴포넌트
pub struct EarTrainer {
    session: Session,
    sounds: SoundBank,
    highlights: Highlights,
    _keydown: Option<EventListener>,
}

impl Component for EarTrainer {
    type Message = EarTrainerMsg;
    type Properties = EarTrainerProps;

    fn create(ctx: &Context<Self>) -> Self {
        let props = ctx.props();
        let session = Session::new(props.pool.clone(), &mut rand::thread_rng());

        let sounds = SoundBank::preload(
            &props.config.layout.unique_notes(),
            &props.config.sounds,
            ctx.link()
                .callback(|(note, load): (Note, ClipLoad)| EarTrainerMsg::ClipSettled(note, load)),
        );

        let keydown = Self::keydown_listener(ctx, props.config.bindings.clone());
        if keydown.is_none() {
            log::error!("document를 찾을 수 없어 키보드 입력을 받을 수 없습니다");
        }

        info!(
            "첫 목표 음: {} (후보 {}개)",
            session.target().label(),
            session.pool().notes().len()
        );

        Self {
            session,
            sounds,
            highlights: Highlights::default(),
            _keydown: keydown,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            EarTrainerMsg::Input(input) => {
                let evaluation = self.session.evaluate(input);
                debug!(
                    "{:?} 입력 {} -> {:?}",
                    input.source, input.note, evaluation.verdict
                );
                if evaluation.verdict == Verdict::Ignored {
                    return false;
                }
                for effect in evaluation.effects {
                    self.apply(ctx, effect);
                }
                true
            }
            EarTrainerMsg::ClearHighlight(note, seq) => {
                // 더 최근에 다시 눌린 건반이면 유지
                self.highlights.clear(note, seq)
            }
            EarTrainerMsg::NextTargetDue(token) => {
                let changed = self
                    .session
                    .next_target_due(token, &mut rand::thread_rng());
                if changed {
                    debug!("다음 목표 음: {}", self.session.target().label());
                }
                changed
            }
            EarTrainerMsg::NewTarget => {
                let target = self.session.new_target(&mut rand::thread_rng());
                debug!("새 목표 음: {}", target.label());
                true
            }
            EarTrainerMsg::Reset => {
                self.session.reset(&mut rand::thread_rng());
                info!("통계 초기화");
                true
            }
            EarTrainerMsg::ToggleNames => {
                self.session.toggle_names();
                true
            }
            EarTrainerMsg::DumpState => {
                let progress = self.sounds.progress();
                let state = serde_json::json!({
                    "session": self.session.snapshot(),
                    "audio": {
                        "loaded": progress.loaded(),
                        "total": progress.total(),
                    },
                });
                info!("상태: {}", state);
                false
            }
            EarTrainerMsg::ClipSettled(note, load) => {
                if load == ClipLoad::Failed {
                    debug!("{} 음원 없이 계속 진행", note);
                }
                let counted = self.sounds.settle(note);
                if counted && self.sounds.progress().is_complete() {
                    info!("음원 로딩 완료 ({}개)", self.sounds.progress().total());
                }
                counted
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let stats = self.session.stats();
        let names_visible = self.session.names_visible();

        html! {
            <div class="ear-trainer">
                <div class="trainer-header">
                    <Card title="목표 음">
                        <div class="target-note">{ self.session.target().label() }</div>
                    </Card>
                    <Card title="통계">
                        <div class="stats">
                            <StatTile label="정답" value={stats.correct.to_string()} kind="correct" />
                            <StatTile label="오답" value={stats.wrong.to_string()} kind="wrong" />
                            <StatTile label="정확도" value={format!("{}%", stats.accuracy())} kind="accuracy" />
                        </div>
                    </Card>
                </div>

                <div class="keyboard">
                    { self.view_column(ctx, Side::Left) }
                    { self.view_column(ctx, Side::Right) }
                </div>

                <div class="trainer-controls">
                    <button class="reset-button" onclick={ctx.link().callback(|_| EarTrainerMsg::Reset)}>
                        {"🔄 통계 초기화"}
                    </button>
                    <button class="toggle-names-button" onclick={ctx.link().callback(|_| EarTrainerMsg::ToggleNames)}>
                        { if names_visible { "🙈 음 이름 숨기기" } else { "👁 음 이름 보이기" } }
                    </button>
                </div>

                <div class={classes!("sound-status", self.sounds.progress().is_complete().then_some("complete"))}>
                    { self.sounds.progress().status_text() }
                </div>
                <div class="hotkey-hint">
                    {"Space: 새 목표 음 · Ctrl+H: 음 이름 표시 전환"}
                </div>
            </div>
        }
    }
}

impl EarTrainer {
    fn apply(&mut self, ctx: &Context<Self>, effect: Effect) {
        let timing = &ctx.props().config.timing;
        match effect {
            Effect::Highlight(note) => {
                let seq = self.highlights.press(note);

                let link = ctx.link().clone();
                Timeout::new(timing.highlight_ms, move || {
                    link.send_message(EarTrainerMsg::ClearHighlight(note, seq));
                })
                .forget();
            }
            Effect::PlaySound(note) => self.sounds.play(&note),
            Effect::ScheduleNextTarget(token) => {
                // 이전 예약은 토큰이 바뀌어 무시됨
                let link = ctx.link().clone();
                Timeout::new(timing.next_target_delay_ms, move || {
                    link.send_message(EarTrainerMsg::NextTargetDue(token));
                })
                .forget();
            }
        }
    }

    fn keydown_listener(ctx: &Context<Self>, bindings: KeyBindings) -> Option<EventListener> {
        let document = web_sys::window()?.document()?;
        let link = ctx.link().clone();

        let listener = EventListener::new_with_options(
            &document,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                let modifiers = Modifiers {
                    ctrl: event.ctrl_key(),
                    alt: event.alt_key(),
                    meta: event.meta_key(),
                };
                let decision = bindings.decide(&event.code(), modifiers, event.repeat());
                if decision.prevents_default() {
                    event.prevent_default();
                }
                // 자동 반복 입력은 채점하지 않음 (누르고 있어도 정답/오답은 한 번만 셈)
                let KeyDecision::Act(action) = decision else {
                    return;
                };

                link.send_message(match action {
                    KeyAction::Play(note) => EarTrainerMsg::Input(NoteInput {
                        source: InputSource::PhysicalKey,
                        note,
                    }),
                    KeyAction::NewTarget => EarTrainerMsg::NewTarget,
                    KeyAction::ToggleNames => EarTrainerMsg::ToggleNames,
                    KeyAction::DumpState => EarTrainerMsg::DumpState,
                });
            },
        );
        Some(listener)
    }

    fn view_column(&self, ctx: &Context<Self>, side: Side) -> Html {
        let config = &ctx.props().config;
        let names_visible = self.session.names_visible();

        html! {
            <div class={classes!("key-column", format!("column-{}", side.as_str()))}>
                {
                    config.layout.column(side).iter().map(|&note| {
                        let onclick = ctx.link().callback(move |_| EarTrainerMsg::Input(NoteInput {
                            source: InputSource::Pointer,
                            note,
                        }));
                        let key_hint = config.bindings.code_for(&note).map(key_label);

                        html! {
                            <div
                                key={note.id()}
                                class={classes!(
                                    "key",
                                    self.highlights.is_active(&note).then_some("active"),
                                    (!names_visible).then_some("hide-names")
                                )}
                                data-note={note.id()}
                                data-side={side.as_str()}
                                title={note.label()}
                                {onclick}
                            >
                                <div class="note-name">{ note.name().letter().to_string() }</div>
                                <div class="octave">{ note.octave().to_string() }</div>
                                if let Some(hint) = key_hint {
                                    <div class="key-hint">{ hint }</div>
                                }
                            </div>
                        }
                    }).collect::<Html>()
                }
            </div>
        }
    }
}
