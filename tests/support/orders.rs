use datamapa::{Mapping, Model, PersistenceError, RecordId, INDEX_COLUMN};

use super::people::Person;

#[derive(Debug, Clone, Default, PartialEq, Model)]
pub struct Order {
    pub id: Option<RecordId>,
    pub number: String,
    pub person: Option<Person>,
    pub lines: Option<Vec<LineItem>>,
    pub notes: Option<Vec<Note>>,
}

impl Order {
    pub fn new(number: &str) -> Self {
        Self {
            number: number.to_string(),
            ..Self::default()
        }
    }

    pub fn with_lines(mut self, lines: Vec<LineItem>) -> Self {
        self.lines = Some(lines);
        self
    }

    pub fn with_notes(mut self, notes: Vec<Note>) -> Self {
        self.notes = Some(notes);
        self
    }

    pub fn line_ids(&self) -> Vec<Option<RecordId>> {
        self.lines
            .iter()
            .flatten()
            .map(|line| line.id)
            .collect()
    }
}

/// Orders own notes and line items, declared in that order.
pub fn order_mapping() -> Result<Mapping<Order>, PersistenceError> {
    Mapping::builder("OrderMapper", "orders", |_| Order::default())
        .simple("number", |o: &Order| &o.number, |o, v| o.number = v)
        .reference(
            "person",
            |o: &Order| o.person.as_ref(),
            |o, p| o.person = Some(p),
        )
        .composed_of(
            "notes",
            |o: &mut Order| o.notes.as_mut(),
            |o, notes| o.notes = Some(notes),
        )
        .composed_of(
            "lines",
            |o: &mut Order| o.lines.as_mut(),
            |o, lines| o.lines = Some(lines),
        )
        .semantic_key(["number"])
        .build()
}

#[derive(Debug, Clone, Default, PartialEq, Model)]
pub struct LineItem {
    pub id: Option<RecordId>,
    pub sku: String,
    pub quantity: u32,
    /// Seeded from the stored position index; never written back.
    pub position: Option<u64>,
    pub discounts: Option<Vec<Discount>>,
}

impl LineItem {
    pub fn new(sku: &str, quantity: u32) -> Self {
        Self {
            sku: sku.to_string(),
            quantity,
            ..Self::default()
        }
    }

    pub fn with_discounts(mut self, discounts: Vec<Discount>) -> Self {
        self.discounts = Some(discounts);
        self
    }
}

pub fn line_item_mapping() -> Result<Mapping<LineItem>, PersistenceError> {
    Mapping::builder("LineItemMapper", "line_items", |record| LineItem {
        position: record.get(INDEX_COLUMN).and_then(|v| v.as_u64()),
        ..LineItem::default()
    })
    .simple("sku", |l: &LineItem| &l.sku, |l, v| l.sku = v)
    .simple("quantity", |l: &LineItem| &l.quantity, |l, v| l.quantity = v)
    .composed_of(
        "discounts",
        |l: &mut LineItem| l.discounts.as_mut(),
        |l, discounts| l.discounts = Some(discounts),
    )
    .composes("order_id")
    .build()
}

#[derive(Debug, Clone, Default, PartialEq, Model)]
pub struct Discount {
    pub id: Option<RecordId>,
    pub percent: u8,
}

impl Discount {
    pub fn new(percent: u8) -> Self {
        Self {
            percent,
            ..Self::default()
        }
    }
}

pub fn discount_mapping() -> Result<Mapping<Discount>, PersistenceError> {
    Mapping::builder("DiscountMapper", "discounts", |_| Discount::default())
        .simple("percent", |d: &Discount| &d.percent, |d, v| d.percent = v)
        .composes("line_item_id")
        .build()
}

#[derive(Debug, Clone, Default, PartialEq, Model)]
pub struct Note {
    pub id: Option<RecordId>,
    pub body: String,
}

impl Note {
    pub fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            ..Self::default()
        }
    }
}

pub fn note_mapping() -> Result<Mapping<Note>, PersistenceError> {
    Mapping::builder("NoteMapper", "notes", |_| Note::default())
        .simple("body", |n: &Note| &n.body, |n, v| n.body = v)
        .composes("order_id")
        .build()
}
