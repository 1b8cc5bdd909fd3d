use super::paragraphs::Paragraph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    Paragraph(Paragraph),
    Examples(Vec<Paragraph>),
}

/// Groups consecutive example paragraphs into one chunk each.
pub struct Chunks<I> {
    paragraphs: I,
    pending: Vec<Paragraph>,
    queued: Option<Paragraph>,
}

pub fn group_examples<I>(paragraphs: I) -> Chunks<I::IntoIter>
where
    I: IntoIterator<Item = Paragraph>,
{
    Chunks {
        paragraphs: paragraphs.into_iter(),
        pending: Vec::new(),
        queued: None,
    }
}

impl<I> Iterator for Chunks<I>
where
    I: Iterator<Item = Paragraph>,
{
    type Item = Chunk;

    fn next(&mut self) -> Option<Chunk> {
        if let Some(paragraph) = self.queued.take() {
            return Some(Chunk::Paragraph(paragraph));
        }

        for paragraph in self.paragraphs.by_ref() {
            if paragraph.is_example() {
                self.pending.push(paragraph);
                continue;
            }
            if self.pending.is_empty() {
                return Some(Chunk::Paragraph(paragraph));
            }
            self.queued = Some(paragraph);
            return Some(Chunk::Examples(std::mem::take(&mut self.pending)));
        }

        if self.pending.is_empty() {
            None
        } else {
            Some(Chunk::Examples(std::mem::take(&mut self.pending)))
        }
    }
}
