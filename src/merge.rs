use crate::lesson::LessonEntry;
use crate::timetable::DayBlock;

/// Collapse runs of back-to-back slots of the same lesson into one entry.
///
/// The run keeps its first entry, which takes the end time of the last one
/// and the summed pair count. Lessons outside runs keep their order.
pub fn collapse_lessons(lessons: Vec<LessonEntry>) -> Vec<LessonEntry> {
    let mut collapsed: Vec<LessonEntry> = Vec::with_capacity(lessons.len());

    for lesson in lessons {
        match collapsed.last_mut() {
            Some(run) if run.name.same_lesson(&lesson.name) => {
                run.end_time = lesson.end_time;
                run.name.pairs += lesson.name.pairs;
            }
            _ => collapsed.push(lesson),
        }
    }

    collapsed
}

/// Merge every block in place; block count and offsets stay the same
pub fn merge_blocks(blocks: &mut [DayBlock]) {
    for block in blocks.iter_mut() {
        block.lessons = collapse_lessons(std::mem::take(&mut block.lessons));
    }
}
