use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

/// Blocks with this many available seats or fewer are flagged as low stock
pub const LOW_STOCK_THRESHOLD: usize = 50;

/// Inventory status of a seat, fixed when the map is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Held,
    Sold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Seat {
    pub seat_number: u32,
    pub status: SeatStatus,
}

impl Seat {
    pub fn is_available(&self) -> bool {
        self.status == SeatStatus::Available
    }
}

/// A row of seats numbered contiguously from 1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Row {
    pub row_number: u32,
    pub seats: Vec<Seat>,
}

impl Row {
    pub fn seat(&self, seat_number: u32) -> Option<&Seat> {
        self.seats.iter().find(|s| s.seat_number == seat_number)
    }

    pub fn available_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_available()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Stand {
    West,
    East,
    North,
    South,
    #[serde(rename = "VIP")]
    Vip,
}

impl Stand {
    /// Display order used when grouping blocks by stand
    pub const ALL: [Stand; 5] = [Stand::Vip, Stand::West, Stand::East, Stand::North, Stand::South];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BlockCategory {
    #[serde(rename = "VIP")]
    Vip,
    Covered,
    East,
    West,
    North,
    South,
    General,
}

/// A seating section with a single per-seat price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Block {
    #[schema(example = "A1")]
    pub id: String,
    #[schema(example = "VIP A1")]
    pub name: String,
    pub stand: Stand,
    pub category: BlockCategory,
    /// Price per seat in ZMW
    #[schema(value_type = String, example = "200")]
    pub price: Decimal,
    pub rows: Vec<Row>,
}

impl Block {
    /// Generate a block of `rows_count` rows with `seats_per_row` seats each
    ///
    /// `sold` decides, per (row, seat), whether the seat is already sold.
    pub fn generate<F>(
        id: &str,
        name: &str,
        stand: Stand,
        category: BlockCategory,
        price: Decimal,
        rows_count: u32,
        seats_per_row: u32,
        sold: F,
    ) -> Self
    where
        F: Fn(u32, u32) -> bool,
    {
        let rows = (1..=rows_count)
            .map(|row_number| Row {
                row_number,
                seats: (1..=seats_per_row)
                    .map(|seat_number| Seat {
                        seat_number,
                        status: if sold(row_number, seat_number) {
                            SeatStatus::Sold
                        } else {
                            SeatStatus::Available
                        },
                    })
                    .collect(),
            })
            .collect();

        Self {
            id: id.to_string(),
            name: name.to_string(),
            stand,
            category,
            price,
            rows,
        }
    }

    pub fn row(&self, row_number: u32) -> Option<&Row> {
        self.rows.iter().find(|r| r.row_number == row_number)
    }

    pub fn available_count(&self) -> usize {
        self.rows.iter().map(Row::available_count).sum()
    }

    pub fn is_low_stock(&self) -> bool {
        let available = self.available_count();
        available > 0 && available <= LOW_STOCK_THRESHOLD
    }
}

/// Seating layout of a venue; immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StadiumMap {
    pub stadium_name: String,
    pub city: String,
    pub blocks: Vec<Block>,
}

impl StadiumMap {
    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    /// Blocks grouped by stand, each group ordered by block id
    pub fn by_stand(&self) -> Vec<(Stand, Vec<&Block>)> {
        Stand::ALL
            .iter()
            .map(|stand| {
                let mut blocks: Vec<&Block> =
                    self.blocks.iter().filter(|b| b.stand == *stand).collect();
                blocks.sort_by(|a, b| natural_cmp(&a.id, &b.id));
                (*stand, blocks)
            })
            .collect()
    }
}

/// Compare identifiers so that embedded numbers order numerically ("C2" < "C10")
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        match (left.peek().copied(), right.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) if l.is_ascii_digit() && r.is_ascii_digit() => {
                let ln = take_number(&mut left);
                let rn = take_number(&mut right);
                match ln.cmp(&rn) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            (Some(l), Some(r)) => {
                match l.to_ascii_lowercase().cmp(&r.to_ascii_lowercase()) {
                    Ordering::Equal => {
                        left.next();
                        right.next();
                    }
                    other => return other,
                }
            }
        }
    }
}

fn take_number<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) -> u64 {
    let mut value: u64 = 0;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        value = value.saturating_mul(10).saturating_add(u64::from(digit));
        chars.next();
    }
    value
}

/// Levy Mwanawasa Stadium, Ndola
pub fn levy_mwanawasa() -> StadiumMap {
    use BlockCategory as C;

    let vip = Decimal::from(200);
    let covered = Decimal::from(120);
    let east = Decimal::from(80);
    let end_stand = Decimal::from(60);
    let general = Decimal::from(50);
    let none = |_: u32, _: u32| false;

    StadiumMap {
        stadium_name: "Levy Mwanawasa Stadium".to_string(),
        city: "Ndola".to_string(),
        blocks: vec![
            Block::generate("A1", "VIP A1", Stand::Vip, C::Vip, vip, 16, 18, |row, seat| row == 5 && seat <= 2),
            Block::generate("A2", "VIP A2", Stand::Vip, C::Vip, vip, 16, 18, none),
            Block::generate("A3", "VIP A3", Stand::Vip, C::Vip, vip, 16, 18, |row, seat| row == 10 && seat >= 17),
            Block::generate("B1", "Covered B1", Stand::West, C::Covered, covered, 20, 20, none),
            Block::generate("B2", "Covered B2", Stand::West, C::Covered, covered, 20, 20, none),
            Block::generate("B3", "Covered B3", Stand::West, C::Covered, covered, 20, 20, none),
            Block::generate("B4", "Covered B4", Stand::West, C::Covered, covered, 20, 20, none),
            Block::generate("C1", "East C1", Stand::East, C::East, east, 22, 26, none),
            Block::generate("C2", "East C2", Stand::East, C::East, east, 22, 26, |row, seat| row <= 2 && seat <= 5),
            Block::generate("C3", "East C3", Stand::East, C::East, east, 22, 26, none),
            Block::generate("C4", "East C4", Stand::East, C::East, east, 22, 26, none),
            Block::generate("C5", "East C5", Stand::East, C::East, east, 22, 26, none),
            Block::generate("D1", "North D1", Stand::North, C::North, end_stand, 18, 28, none),
            Block::generate("D2", "North D2", Stand::North, C::North, end_stand, 18, 28, none),
            Block::generate("D3", "North D3", Stand::North, C::North, end_stand, 18, 28, none),
            Block::generate("E1", "South E1", Stand::South, C::South, end_stand, 18, 28, none),
            Block::generate("E2", "South E2", Stand::South, C::South, end_stand, 18, 28, none),
            Block::generate("E3", "South E3", Stand::South, C::South, end_stand, 18, 28, none),
            Block::generate("GA", "General Admission", Stand::East, C::General, general, 12, 40, |row, _| row <= 1),
        ],
    }
}
