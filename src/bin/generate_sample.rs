use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use pitchlens::data::model::PitchBounds;

const PLAYERS: [&str; 6] = [
    "Toni Kroos",
    "İlkay Gündoğan",
    "Jamal Musiala",
    "Florian Wirtz",
    "Antonio Rüdiger",
    "Kai Havertz",
];

/// Deterministic splitmix64 stream.
struct SplitMix(u64);

impl SplitMix {
    fn next_u64(&mut self) -> u64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    fn unit(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Columns of the flat event table, filled row by row.
#[derive(Default)]
struct EventColumns {
    player: StringBuilder,
    kind: StringBuilder,
    x: Float64Builder,
    y: Float64Builder,
    end_x: Float64Builder,
    end_y: Float64Builder,
    minute: Int64Builder,
    second: Int64Builder,
    outcome: StringBuilder,
}

impl EventColumns {
    fn marker(&mut self, kind: &str, clock: i64) {
        self.player.append_null();
        self.kind.append_value(kind);
        for col in [&mut self.x, &mut self.y, &mut self.end_x, &mut self.end_y] {
            col.append_null();
        }
        self.minute.append_value(clock / 60);
        self.second.append_value(clock % 60);
        self.outcome.append_null();
    }

    fn action(
        &mut self,
        player: &str,
        kind: &str,
        clock: i64,
        from: (f64, f64),
        to: (f64, f64),
        outcome: Option<&str>,
    ) {
        self.player.append_value(player);
        self.kind.append_value(kind);
        self.x.append_value(from.0);
        self.y.append_value(from.1);
        self.end_x.append_value(to.0);
        self.end_y.append_value(to.1);
        self.minute.append_value(clock / 60);
        self.second.append_value(clock % 60);
        self.outcome.append_option(outcome);
    }

    fn finish(mut self) -> Result<RecordBatch> {
        let nullable = |name: &str, dt: DataType| Field::new(name, dt, true);
        let schema = Arc::new(Schema::new(vec![
            nullable("player_name", DataType::Utf8),
            Field::new("type_name", DataType::Utf8, false),
            nullable("x", DataType::Float64),
            nullable("y", DataType::Float64),
            nullable("end_x", DataType::Float64),
            nullable("end_y", DataType::Float64),
            Field::new("minute", DataType::Int64, false),
            Field::new("second", DataType::Int64, false),
            nullable("outcome_name", DataType::Utf8),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(self.player.finish()),
            Arc::new(self.kind.finish()),
            Arc::new(self.x.finish()),
            Arc::new(self.y.finish()),
            Arc::new(self.end_x.finish()),
            Arc::new(self.end_y.finish()),
            Arc::new(self.minute.finish()),
            Arc::new(self.second.finish()),
            Arc::new(self.outcome.finish()),
        ];
        RecordBatch::try_new(schema, columns).context("assembling record batch")
    }
}

fn main() -> Result<()> {
    let pitch = PitchBounds::default();
    let mut rng = SplitMix(3_930_158);
    let mut events = EventColumns::default();

    events.marker("Starting XI", 0);
    events.marker("Half Start", 0);

    let mut clock: i64 = 0;
    let mut rows = 2;
    while clock < 90 * 60 {
        let player = PLAYERS[rng.below(PLAYERS.len())];
        let from = (rng.unit() * pitch.length, rng.unit() * pitch.width);
        let carry = rng.unit() < 0.3;
        let reach = if carry { 8.0 } else { 35.0 };
        let to = (
            (from.0 + (rng.unit() - 0.35) * reach).clamp(0.0, pitch.length),
            (from.1 + (rng.unit() - 0.5) * reach).clamp(0.0, pitch.width),
        );
        let (kind, outcome) = if carry {
            ("Carry", None)
        } else if rng.unit() < 0.12 {
            ("Pass", Some("Incomplete"))
        } else {
            ("Pass", None)
        };
        events.action(player, kind, clock, from, to, outcome);
        rows += 1;
        clock += 5 + rng.below(25) as i64;
    }

    let batch = events.finish()?;

    let output_path = "sample_events.parquet";
    let file = std::fs::File::create(output_path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;

    println!("Wrote {rows} events to {output_path}");
    Ok(())
}
