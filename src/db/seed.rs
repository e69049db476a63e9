//! Starter catalog seed data.
//!
//! Inserted only when the languages table is empty, so a fresh deployment
//! has something to serve before an admin authors real content.

use rusqlite::{Connection, Result};

use crate::db::catalog;
use crate::domain::Level;

struct SeedExercise {
    kind: &'static str,
    question: &'static str,
    options: &'static [&'static str],
    answers: &'static [&'static str],
    explanation: Option<&'static str>,
}

struct SeedLesson {
    title: &'static str,
    level: Level,
    order: i64,
    exercises: &'static [SeedExercise],
}

pub fn seed_catalog(conn: &Connection) -> Result<()> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM languages", [], |row| row.get(0))?;
    if count > 0 {
        return Ok(());
    }

    tracing::info!("Seeding starter catalog");

    let spanish = catalog::insert_language(
        conn,
        "spanish",
        "Spanish",
        None,
        Some("Learn Spanish from scratch"),
    )?;
    seed_lessons(conn, spanish, SPANISH_LESSONS)?;

    let french = catalog::insert_language(
        conn,
        "french",
        "French",
        None,
        Some("Learn French from scratch"),
    )?;
    seed_lessons(conn, french, FRENCH_LESSONS)?;

    Ok(())
}

fn seed_lessons(conn: &Connection, language_id: i64, lessons: &[SeedLesson]) -> Result<()> {
    for lesson in lessons {
        let lesson_id = catalog::insert_lesson(
            conn,
            lesson.title,
            None,
            language_id,
            lesson.level,
            lesson.order,
        )?;
        for (position, ex) in lesson.exercises.iter().enumerate() {
            let options: Vec<String> = ex.options.iter().map(|s| s.to_string()).collect();
            let answers: Vec<String> = ex.answers.iter().map(|s| s.to_string()).collect();
            catalog::insert_exercise(
                conn,
                lesson_id,
                position as i64,
                ex.kind,
                ex.question,
                &options,
                &answers,
                ex.explanation,
            )?;
        }
    }
    Ok(())
}

const SPANISH_LESSONS: &[SeedLesson] = &[
    SeedLesson {
        title: "Greetings",
        level: Level::Beginner,
        order: 0,
        exercises: &[
            SeedExercise {
                kind: "multipleChoice",
                question: "How do you say 'hello' in Spanish?",
                options: &["Hola", "Adiós", "Gracias", "Por favor"],
                answers: &["Hola"],
                explanation: Some("'Hola' is the standard greeting."),
            },
            SeedExercise {
                kind: "text",
                question: "Translate to Spanish: thank you",
                options: &[],
                answers: &["Gracias"],
                explanation: None,
            },
            SeedExercise {
                kind: "fillInTheBlanks",
                question: "Buenos ___, ¿cómo estás? (good morning)",
                options: &[],
                answers: &["días"],
                explanation: Some("'Buenos días' means good morning."),
            },
        ],
    },
    SeedLesson {
        title: "Numbers 1-10",
        level: Level::Beginner,
        order: 1,
        exercises: &[
            SeedExercise {
                kind: "multipleChoice",
                question: "Which number is 'siete'?",
                options: &["5", "6", "7", "8"],
                answers: &["7"],
                explanation: None,
            },
            SeedExercise {
                kind: "text",
                question: "Write 'three' in Spanish",
                options: &[],
                answers: &["tres"],
                explanation: None,
            },
        ],
    },
    SeedLesson {
        title: "Past tense basics",
        level: Level::Intermediate,
        order: 0,
        exercises: &[SeedExercise {
            kind: "fillInTheBlanks",
            question: "Ayer yo ___ al mercado. (ir, preterite)",
            options: &[],
            answers: &["fui"],
            explanation: Some("'Ir' is irregular in the preterite: fui, fuiste, fue..."),
        }],
    },
];

const FRENCH_LESSONS: &[SeedLesson] = &[
    SeedLesson {
        title: "Greetings",
        level: Level::Beginner,
        order: 0,
        exercises: &[
            SeedExercise {
                kind: "multipleChoice",
                question: "How do you say 'goodbye' in French?",
                options: &["Bonjour", "Au revoir", "Merci", "Oui"],
                answers: &["Au revoir"],
                explanation: None,
            },
            SeedExercise {
                kind: "text",
                question: "Translate to French: please",
                options: &[],
                answers: &["s'il vous plaît"],
                explanation: Some("Formal form; 's'il te plaît' is informal."),
            },
        ],
    },
    SeedLesson {
        title: "Articles",
        level: Level::Beginner,
        order: 1,
        exercises: &[SeedExercise {
            kind: "multipleChoice",
            question: "Which article goes with 'maison'?",
            options: &["le", "la", "les"],
            answers: &["la"],
            explanation: Some("'Maison' is feminine: la maison."),
        }],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn seed_runs_once() {
        let env = TestEnv::new().unwrap();
        seed_catalog(&env.conn).unwrap();
        // Second call sees a non-empty catalog and must not duplicate
        seed_catalog(&env.conn).unwrap();
        let languages = catalog::list_languages(&env.conn).unwrap();
        assert_eq!(languages.len(), 2);
    }

    #[test]
    fn seeded_multiple_choice_answers_are_among_options() {
        let env = TestEnv::new().unwrap();
        seed_catalog(&env.conn).unwrap();
        for language in catalog::list_languages(&env.conn).unwrap() {
            for lesson in catalog::lessons_by_language(&env.conn, language.id).unwrap() {
                for ex in &lesson.exercises {
                    if ex.kind == "multipleChoice" {
                        for answer in &ex.correct_answers {
                            assert!(
                                ex.options.contains(answer),
                                "answer {:?} missing from options of {:?}",
                                answer,
                                ex.question
                            );
                        }
                    }
                }
            }
        }
    }
}
