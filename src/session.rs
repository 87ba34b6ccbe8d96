//! 청음 세션 상태와 입력 판정.
//!
//! 브라우저 타입에 의존하지 않음. 판정 결과는 [`Effect`] 목록으로 돌려주고,
//! 실제 하이라이트, 재생, 타이머 예약은 컴포넌트가 수행한다.

use crate::note::Note;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;

/// 목표 음 후보. 항상 한 개 이상의 음을 가짐
#[derive(Debug, Clone, PartialEq)]
pub struct NotePool {
    notes: Vec<Note>,
}

impl NotePool {
    pub fn new(notes: Vec<Note>) -> Option<Self> {
        if notes.is_empty() {
            None
        } else {
            Some(Self { notes })
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn contains(&self, note: &Note) -> bool {
        self.notes.contains(note)
    }

    /// 균등 확률로 하나 선택 (연속 중복 허용)
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Note {
        self.notes[rng.gen_range(0..self.notes.len())]
    }
}

/// 입력 출처
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSource {
    Pointer,
    PhysicalKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteInput {
    pub source: InputSource,
    pub note: Note,
}

/// 예약된 다음 목표 전환의 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Wrong,
    /// 건반에 없는 음
    Ignored,
}

/// 판정 후 컴포넌트가 실행할 부수 효과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Highlight(Note),
    PlaySound(Note),
    ScheduleNextTarget(TargetToken),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    /// 정답 후 다음 목표를 기다리는 중
    AwaitingNextTarget,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub correct: u32,
    pub wrong: u32,
}

impl Stats {
    pub fn attempts(&self) -> u32 {
        self.correct.saturating_add(self.wrong)
    }

    /// 반올림한 정확도 (%), 시도가 없으면 0
    pub fn accuracy(&self) -> u32 {
        let attempts = self.correct as u64 + self.wrong as u64;
        if attempts == 0 {
            return 0;
        }
        // round(100 * correct / attempts)를 정수 연산으로
        ((200 * self.correct as u64 + attempts) / (2 * attempts)) as u32
    }
}

/// 디버그 덤프용 상태 사본
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub target: Note,
    pub correct: u32,
    pub wrong: u32,
    pub attempts: u32,
    pub accuracy: u32,
    pub names_visible: bool,
    pub phase: Phase,
}

/// 눌린 건반 하이라이트. 키마다 세대 번호를 붙여
/// 예전 타이머가 새 하이라이트를 지우지 못하게 함
#[derive(Debug, Default)]
pub struct Highlights {
    active: HashMap<Note, u32>,
    seq: u32,
}

impl Highlights {
    /// 하이라이트를 켜고 해제 타이머에 넘길 세대 번호를 돌려줌
    pub fn press(&mut self, note: Note) -> u32 {
        self.seq = self.seq.wrapping_add(1);
        self.active.insert(note, self.seq);
        self.seq
    }

    /// 세대 번호가 최신일 때만 해제. 실제로 지웠으면 true
    pub fn clear(&mut self, note: Note, seq: u32) -> bool {
        if self.active.get(&note) != Some(&seq) {
            return false;
        }
        self.active.remove(&note);
        true
    }

    pub fn is_active(&self, note: &Note) -> bool {
        self.active.contains_key(note)
    }
}

pub struct Session {
    pool: NotePool,
    target: Note,
    stats: Stats,
    names_visible: bool,
    pending: Option<TargetToken>,
    last_token: u64,
}

impl Session {
    pub fn new<R: Rng + ?Sized>(pool: NotePool, rng: &mut R) -> Self {
        let target = pool.choose(rng);
        Self {
            pool,
            target,
            stats: Stats::default(),
            names_visible: true,
            pending: None,
            last_token: 0,
        }
    }

    pub fn target(&self) -> Note {
        self.target
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn names_visible(&self) -> bool {
        self.names_visible
    }

    pub fn pool(&self) -> &NotePool {
        &self.pool
    }

    pub fn phase(&self) -> Phase {
        if self.pending.is_some() {
            Phase::AwaitingNextTarget
        } else {
            Phase::Idle
        }
    }

    /// 음 입력 하나를 판정하고 상태를 갱신
    pub fn evaluate(&mut self, input: NoteInput) -> Evaluation {
        let note = input.note;
        if !self.pool.contains(&note) {
            return Evaluation {
                verdict: Verdict::Ignored,
                effects: Vec::new(),
            };
        }

        let mut effects = vec![Effect::Highlight(note)];
        let verdict = if note == self.target {
            self.stats.correct = self.stats.correct.saturating_add(1);
            Verdict::Correct
        } else {
            self.stats.wrong = self.stats.wrong.saturating_add(1);
            Verdict::Wrong
        };

        // 정답 여부와 관계없이 소리는 항상 재생
        effects.push(Effect::PlaySound(note));

        if verdict == Verdict::Correct {
            // 대기 중인 전환이 있으면 새 토큰으로 교체
            effects.push(Effect::ScheduleNextTarget(self.schedule()));
        }

        Evaluation { verdict, effects }
    }

    /// 예약된 전환 시점. 토큰이 현재 예약과 다르면 무시하고 false
    pub fn next_target_due<R: Rng + ?Sized>(&mut self, token: TargetToken, rng: &mut R) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        self.target = self.pool.choose(rng);
        true
    }

    /// 대기 중인 전환을 취소하고 바로 새 목표 선택
    pub fn new_target<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Note {
        self.pending = None;
        self.target = self.pool.choose(rng);
        self.target
    }

    /// 점수 초기화 후 새 목표. 이름 표시 여부는 유지
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.stats = Stats::default();
        self.new_target(rng);
    }

    pub fn toggle_names(&mut self) -> bool {
        self.names_visible = !self.names_visible;
        self.names_visible
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            target: self.target,
            correct: self.stats.correct,
            wrong: self.stats.wrong,
            attempts: self.stats.attempts(),
            accuracy: self.stats.accuracy(),
            names_visible: self.names_visible,
            phase: self.phase(),
        }
    }

    fn schedule(&mut self) -> TargetToken {
        self.last_token += 1;
        let token = TargetToken(self.last_token);
        self.pending = Some(token);
        token
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::TrainerConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn pool() -> NotePool {
        let config = TrainerConfig::embedded().unwrap();
        NotePool::new(config.layout.pool()).unwrap()
    }

    fn stats(correct: u32, wrong: u32) -> Stats {
        Stats { correct, wrong }
    }

    fn press(note: Note) -> NoteInput {
        NoteInput {
            source: InputSource::PhysicalKey,
            note,
        }
    }

    fn wrong_note(session: &Session) -> Note {
        *session
            .pool()
            .notes()
            .iter()
            .find(|note| **note != session.target())
            .unwrap()
    }

    fn scheduled_token(evaluation: &Evaluation) -> Option<TargetToken> {
        evaluation.effects.iter().find_map(|effect| match effect {
            Effect::ScheduleNextTarget(token) => Some(*token),
            _ => None,
        })
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(NotePool::new(Vec::new()).is_none());
    }

    #[test]
    fn accuracy_rounds_and_handles_zero() {
        assert_eq!(Stats::default().accuracy(), 0);
        assert_eq!(stats(3, 1).accuracy(), 75);
        assert_eq!(stats(1, 2).accuracy(), 33);
        assert_eq!(stats(2, 1).accuracy(), 67);
        assert_eq!(stats(1, 7).accuracy(), 13);
        assert_eq!(stats(5, 0).accuracy(), 100);
        assert_eq!(stats(0, 4).accuracy(), 0);
    }

    #[test]
    fn targets_come_from_the_pool() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        for _ in 0..200 {
            let target = session.new_target(&mut rng);
            assert!(session.pool().contains(&target));
        }
    }

    #[test]
    fn target_distribution_is_roughly_uniform() {
        let mut rng = rng();
        let pool = pool();
        let mut counts: HashMap<Note, u32> = HashMap::new();
        let draws = 22_000;
        for _ in 0..draws {
            *counts.entry(pool.choose(&mut rng)).or_default() += 1;
        }
        assert_eq!(counts.len(), 22);
        for (note, count) in counts {
            assert!((700..1300).contains(&count), "{note}: {count}");
        }
    }

    #[test]
    fn correct_then_wrong_scenario() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        assert_eq!(session.stats(), Stats::default());

        let target = session.target();
        let evaluation = session.evaluate(press(target));
        assert_eq!(evaluation.verdict, Verdict::Correct);
        assert_eq!(session.stats(), stats(1, 0));
        assert_eq!(session.stats().accuracy(), 100);
        assert_eq!(session.phase(), Phase::AwaitingNextTarget);

        let token = scheduled_token(&evaluation).unwrap();
        assert!(session.next_target_due(token, &mut rng));
        assert_eq!(session.phase(), Phase::Idle);

        let miss = wrong_note(&session);
        let evaluation = session.evaluate(press(miss));
        assert_eq!(evaluation.verdict, Verdict::Wrong);
        assert_eq!(session.stats(), stats(1, 1));
        assert_eq!(session.stats().accuracy(), 50);
    }

    #[test]
    fn effects_highlight_and_play_regardless_of_verdict() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        let miss = wrong_note(&session);
        let evaluation = session.evaluate(NoteInput {
            source: InputSource::Pointer,
            note: miss,
        });
        assert_eq!(
            evaluation.effects,
            vec![Effect::Highlight(miss), Effect::PlaySound(miss)]
        );

        let target = session.target();
        let evaluation = session.evaluate(press(target));
        assert_eq!(evaluation.effects[0], Effect::Highlight(target));
        assert_eq!(evaluation.effects[1], Effect::PlaySound(target));
        assert!(scheduled_token(&evaluation).is_some());
    }

    #[test]
    fn mismatch_never_changes_target() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        let target = session.target();
        for _ in 0..10 {
            let miss = wrong_note(&session);
            let evaluation = session.evaluate(press(miss));
            assert_eq!(scheduled_token(&evaluation), None);
        }
        assert_eq!(session.target(), target);
        assert_eq!(session.stats(), stats(0, 10));
        assert_eq!(session.phase(), Phase::Idle);
    }

    #[test]
    fn notes_off_the_keyboard_are_ignored() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        let evaluation = session.evaluate(press("c9".parse().unwrap()));
        assert_eq!(evaluation.verdict, Verdict::Ignored);
        assert!(evaluation.effects.is_empty());
        assert_eq!(session.stats().attempts(), 0);
    }

    #[test]
    fn repeated_matches_collapse_into_one_transition() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        let target = session.target();

        let first = scheduled_token(&session.evaluate(press(target))).unwrap();
        let second = scheduled_token(&session.evaluate(press(target))).unwrap();
        assert_ne!(first, second);
        assert_eq!(session.stats().correct, 2);

        // 먼저 예약된 타이머는 무시됨
        assert!(!session.next_target_due(first, &mut rng));
        assert_eq!(session.target(), target);
        assert!(session.next_target_due(second, &mut rng));
        assert!(!session.next_target_due(second, &mut rng));
    }

    #[test]
    fn reset_clears_counts_and_keeps_visibility() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        session.toggle_names();
        let target = session.target();
        let token = scheduled_token(&session.evaluate(press(target))).unwrap();
        let miss = wrong_note(&session);
        session.evaluate(press(miss));

        session.reset(&mut rng);
        assert_eq!(session.stats(), Stats::default());
        assert!(!session.names_visible());
        assert!(session.pool().contains(&session.target()));
        // 초기화가 대기 중인 전환을 취소
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.next_target_due(token, &mut rng));
    }

    #[test]
    fn forced_new_target_cancels_pending_transition() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        let target = session.target();
        let token = scheduled_token(&session.evaluate(press(target))).unwrap();
        let forced = session.new_target(&mut rng);
        assert!(!session.next_target_due(token, &mut rng));
        assert_eq!(session.target(), forced);
        assert_eq!(session.stats().correct, 1);
    }

    #[test]
    fn toggling_names_twice_restores_visibility() {
        let mut rng = rng();
        let mut session = Session::new(pool(), &mut rng);
        assert!(session.names_visible());
        assert!(!session.toggle_names());
        assert!(session.toggle_names());
        assert!(session.names_visible());
    }

    #[test]
    fn snapshot_serializes() {
        let mut rng = rng();
        let session = Session::new(pool(), &mut rng);
        let json = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(json["target"], session.target().id());
        assert_eq!(json["attempts"], 0);
        assert_eq!(json["accuracy"], 0);
        assert_eq!(json["phase"], "Idle");
    }

    #[test]
    fn older_highlight_clear_keeps_newer_press() {
        let c4: Note = "c4".parse().unwrap();
        let mut highlights = Highlights::default();
        assert!(!highlights.is_active(&c4));

        let first = highlights.press(c4);
        let second = highlights.press(c4);
        assert_ne!(first, second);

        // 첫 입력의 타이머가 두 번째 하이라이트를 끄면 안 됨
        assert!(!highlights.clear(c4, first));
        assert!(highlights.is_active(&c4));

        assert!(highlights.clear(c4, second));
        assert!(!highlights.is_active(&c4));
        assert!(!highlights.clear(c4, second));
    }

    #[test]
    fn highlights_are_tracked_per_key() {
        let c4: Note = "c4".parse().unwrap();
        let e4: Note = "e4".parse().unwrap();
        let mut highlights = Highlights::default();
        let c4_seq = highlights.press(c4);
        let e4_seq = highlights.press(e4);

        // 다른 키의 세대 번호로는 지워지지 않음
        assert!(!highlights.clear(c4, e4_seq));
        assert!(highlights.clear(c4, c4_seq));
        assert!(!highlights.is_active(&c4));
        assert!(highlights.is_active(&e4));
    }
}
