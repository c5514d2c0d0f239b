use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::db::Question;

/// Quiz category id meaning "questions from every category".
pub const ANY_CATEGORY: i64 = 0;

/// Picks the next quiz question uniformly among `questions` not already in `previous`.
///
/// Returns `None` once every question in scope has been played.
pub fn next_question<R: Rng + ?Sized>(
    questions: Vec<Question>,
    previous: &[i64],
    rng: &mut R,
) -> Option<Question> {
    let seen: HashSet<i64> = previous.iter().copied().collect();
    let candidates: Vec<Question> = questions
        .into_iter()
        .filter(|q| !seen.contains(&q.id))
        .collect();
    candidates.choose(rng).cloned()
}

/// Random source shared by all quiz requests.
#[derive(Clone)]
pub struct QuizRng(Arc<Mutex<StdRng>>);

impl QuizRng {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        QuizRng(Arc::new(Mutex::new(rng)))
    }

    pub fn pick(&self, questions: Vec<Question>, previous: &[i64]) -> Option<Question> {
        let mut rng = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        next_question(questions, previous, &mut *rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(ids: &[i64]) -> Vec<Question> {
        ids.iter()
            .map(|&id| Question {
                id,
                question: format!("Question {id}"),
                answer: "answer".to_owned(),
                category: 1,
                difficulty: 1,
            })
            .collect()
    }

    #[test]
    fn never_returns_previous_questions() {
        let mut rng = StdRng::seed_from_u64(7);
        let previous = [1, 3, 5];
        for _ in 0..100 {
            let q = next_question(questions(&[1, 2, 3, 4, 5]), &previous, &mut rng).unwrap();
            assert!(!previous.contains(&q.id));
        }
    }

    #[test]
    fn exhausted_quiz_returns_none() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(next_question(questions(&[1, 2]), &[2, 1], &mut rng).is_none());
        assert!(next_question(vec![], &[], &mut rng).is_none());
    }

    #[test]
    fn playing_through_visits_every_question_once() {
        let rng = QuizRng::new(Some(11));
        let all = [4, 8, 15, 16, 23, 42];
        let mut previous = vec![];
        while let Some(q) = rng.pick(questions(&all), &previous) {
            previous.push(q.id);
        }
        previous.sort();
        assert_eq!(previous, all);
    }

    #[test]
    fn same_seed_same_sequence() {
        let play = |seed| {
            let rng = QuizRng::new(Some(seed));
            let mut previous = vec![];
            while let Some(q) = rng.pick(questions(&[1, 2, 3, 4, 5, 6, 7]), &previous) {
                previous.push(q.id);
            }
            previous
        };
        assert_eq!(play(3), play(3));
    }

    #[test]
    fn every_candidate_can_be_picked() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut picked = HashSet::new();
        for _ in 0..200 {
            let q = next_question(questions(&[1, 2, 3]), &[], &mut rng).unwrap();
            picked.insert(q.id);
        }
        assert_eq!(picked.len(), 3);
    }
}
