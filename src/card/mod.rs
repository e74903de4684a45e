mod config;
pub use config::*;

pub mod markup;
pub use markup::{CardFace, Markup};

use crate::print::{CardSource, CardView};
use crate::records::Record;
use crate::symbol::{SymbolEncoder, SymbolRenderer};

/// The records of one job bound to the configuration and symbol renderer used to draw them.
pub struct CardDeck<'a, E: SymbolEncoder> {
    pub records: &'a [Record],
    pub config: &'a CardConfig,
    pub renderer: &'a SymbolRenderer<E>,
}

impl<E: SymbolEncoder> CardSource for CardDeck<'_, E> {
    fn len(&self) -> usize {
        self.records.len()
    }

    fn label(&self, index: usize) -> String {
        self.records[index].label()
    }

    fn markup(&self, index: usize, view: CardView) -> Markup {
        let record = &self.records[index];
        match view {
            CardView::Face(CardFace::Front) => markup::front(record, self.config),
            CardView::Face(CardFace::Back) => markup::back(record, self.config, self.renderer),
            CardView::Pair => markup::pair(record, self.config, self.renderer),
        }
    }
}
