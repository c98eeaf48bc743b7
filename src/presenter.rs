use std::io::{self, Write};

use crate::result_renderer::DisplayModel;

/// Shows a `DisplayModel` to the user.
pub trait Presenter {
    fn present(&mut self, model: &DisplayModel) -> io::Result<()>;
}

/// Writes display models as plain text.
pub struct TextPresenter<W: Write> {
    out: W,
}

impl<W: Write> TextPresenter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TextPresenter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Presenter for TextPresenter<W> {
    fn present(&mut self, model: &DisplayModel) -> io::Result<()> {
        if model.working {
            writeln!(self.out, "{}", model.trigger.label)?;
            return self.out.flush();
        }
        if let Some(notice) = &model.notice {
            writeln!(self.out, "{}", notice.message())?;
        }
        if let Some(strategy) = model.strategy {
            writeln!(self.out, "== {} ==", strategy)?;
        }
        for (index, card) in model.cards.iter().enumerate() {
            writeln!(self.out)?;
            for (line_no, line) in card.text_lines().iter().enumerate() {
                if line_no == 0 {
                    writeln!(self.out, "{}. {}", index + 1, line)?;
                } else {
                    writeln!(self.out, "   {}", line)?;
                }
            }
        }
        if let Some(complements) = &model.complements {
            writeln!(self.out)?;
            writeln!(self.out, "Complementary ingredients: {}", complements.tags.join(" | "))?;
            writeln!(self.out, "{}", complements.note)?;
        }
        self.out.flush()
    }
}
