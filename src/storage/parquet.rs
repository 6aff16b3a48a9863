//! Parquet match tables.
//!
//! Replay exports are columnar tables with one `p1_*` / `p2_*` column per
//! player field. Integer columns of any width are accepted on read; the
//! writer always emits Int64 and Utf8 columns.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Field, Int64Type, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tracing::{debug, info};

use super::{RowSource, StorageError};
use crate::models::{MatchRecord, MatchRow};

/// Schema definition for match tables.
pub mod schema {
    use super::*;

    fn player_fields(prefix: &str) -> Vec<Field> {
        vec![
            Field::new(format!("{}_chara_id", prefix), DataType::Int64, false),
            Field::new(format!("{}_name", prefix), DataType::Utf8, true),
            Field::new(format!("{}_polaris_id", prefix), DataType::Utf8, false),
            Field::new(format!("{}_power", prefix), DataType::Int64, true),
            Field::new(format!("{}_rank", prefix), DataType::Int64, false),
            Field::new(format!("{}_rating_before", prefix), DataType::Int64, true),
            Field::new(format!("{}_rating_change", prefix), DataType::Int64, true),
            Field::new(format!("{}_rounds", prefix), DataType::Int64, true),
            Field::new(format!("{}_user_id", prefix), DataType::Int64, true),
            Field::new(format!("{}_region_id", prefix), DataType::Int64, true),
            Field::new(format!("{}_area_id", prefix), DataType::Int64, true),
            Field::new(format!("{}_lang", prefix), DataType::Utf8, true),
        ]
    }

    /// Schema for the match table.
    pub fn matches_schema() -> Schema {
        let mut fields = vec![
            Field::new("battle_at", DataType::Int64, false),
            Field::new("battle_id", DataType::Utf8, false),
            Field::new("battle_type", DataType::Int64, true),
            Field::new("game_version", DataType::Int64, true),
        ];
        fields.extend(player_fields("p1"));
        fields.extend(player_fields("p2"));
        fields.push(Field::new("stage_id", DataType::Int64, true));
        fields.push(Field::new("winner", DataType::Int64, false));
        Schema::new(fields)
    }
}

/// Parquet match table writer.
pub struct ParquetMatchWriter {
    path: PathBuf,
}

impl ParquetMatchWriter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Ensure the directory exists.
    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write matches, replacing the file.
    pub fn write_matches(&self, records: &[MatchRecord]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let rows: Vec<MatchRow> = records.iter().map(MatchRow::from).collect();
        let schema = Arc::new(schema::matches_schema());

        let int = |f: fn(&MatchRow) -> i64| -> ArrayRef {
            Arc::new(Int64Array::from_iter_values(rows.iter().map(f)))
        };
        let opt_int = |f: fn(&MatchRow) -> Option<i64>| -> ArrayRef {
            Arc::new(rows.iter().map(f).collect::<Int64Array>())
        };
        let text = |f: fn(&MatchRow) -> &str| -> ArrayRef {
            Arc::new(StringArray::from_iter_values(rows.iter().map(f)))
        };
        let opt_text = |f: fn(&MatchRow) -> Option<&str>| -> ArrayRef {
            Arc::new(rows.iter().map(f).collect::<StringArray>())
        };

        let columns = vec![
            int(|r| r.battle_at),
            text(|r| r.battle_id.as_str()),
            int(|r| r.battle_type),
            int(|r| r.game_version),
            int(|r| r.p1_chara_id as i64),
            text(|r| r.p1_name.as_str()),
            text(|r| r.p1_polaris_id.as_str()),
            int(|r| r.p1_power),
            int(|r| r.p1_rank as i64),
            int(|r| r.p1_rating_before),
            int(|r| r.p1_rating_change),
            int(|r| r.p1_rounds as i64),
            int(|r| r.p1_user_id),
            opt_int(|r| r.p1_region_id),
            opt_int(|r| r.p1_area_id),
            opt_text(|r| r.p1_lang.as_deref()),
            int(|r| r.p2_chara_id as i64),
            text(|r| r.p2_name.as_str()),
            text(|r| r.p2_polaris_id.as_str()),
            int(|r| r.p2_power),
            int(|r| r.p2_rank as i64),
            int(|r| r.p2_rating_before),
            int(|r| r.p2_rating_change),
            int(|r| r.p2_rounds as i64),
            int(|r| r.p2_user_id),
            opt_int(|r| r.p2_region_id),
            opt_int(|r| r.p2_area_id),
            opt_text(|r| r.p2_lang.as_deref()),
            int(|r| r.stage_id),
            int(|r| r.winner),
        ];

        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        self.write_batch(&schema, &batch)?;

        info!("Wrote {} matches to {:?}", rows.len(), self.path);
        Ok(rows.len())
    }

    /// Write a record batch to the Parquet file.
    fn write_batch(&self, schema: &Arc<Schema>, batch: &RecordBatch) -> Result<(), StorageError> {
        let file = File::create(&self.path)?;

        let props = WriterProperties::builder()
            .set_compression(Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;
        writer.write(batch)?;
        writer.close()?;

        Ok(())
    }
}

/// Match rows stored as Parquet.
pub struct ParquetMatchSource {
    path: PathBuf,
}

impl ParquetMatchSource {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read all record batches from the file.
    pub fn read_batches(&self) -> Result<Vec<RecordBatch>, StorageError> {
        if !self.path.exists() {
            return Err(StorageError::PathNotFound(self.path.clone()));
        }

        let file = File::open(&self.path)?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;
        let batches = reader.collect::<Result<Vec<_>, _>>()?;

        debug!("Read {} batches from {:?}", batches.len(), self.path);
        Ok(batches)
    }
}

impl RowSource for ParquetMatchSource {
    fn row_count(&self) -> Result<usize, StorageError> {
        let file = File::open(&self.path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        Ok(builder.metadata().file_metadata().num_rows() as usize)
    }

    fn read_matches(&self) -> Result<Vec<MatchRecord>, StorageError> {
        let mut records = Vec::new();
        for batch in self.read_batches()? {
            let offset = records.len();
            for row in rows_from_batch(&batch, offset)? {
                records.push(MatchRecord::from(row));
            }
        }
        Ok(records)
    }
}

/// An integer column, absent columns read as all-null.
struct IntColumn {
    name: String,
    values: Option<Int64Array>,
    offset: usize,
}

impl IntColumn {
    fn load(
        batch: &RecordBatch,
        name: &str,
        required: bool,
        offset: usize,
    ) -> Result<Self, StorageError> {
        let values = match batch.column_by_name(name) {
            Some(column) => {
                let column = cast(column, &DataType::Int64)?;
                Some(column.as_primitive::<Int64Type>().clone())
            }
            None if required => return Err(StorageError::MissingColumn(name.to_string())),
            None => None,
        };
        Ok(Self {
            name: name.to_string(),
            values,
            offset,
        })
    }

    fn opt(&self, row: usize) -> Option<i64> {
        self.values
            .as_ref()
            .filter(|v| v.is_valid(row))
            .map(|v| v.value(row))
    }

    fn or_zero(&self, row: usize) -> i64 {
        self.opt(row).unwrap_or(0)
    }

    fn invalid(&self, row: usize) -> StorageError {
        StorageError::InvalidValue {
            column: self.name.clone(),
            row: self.offset + row,
        }
    }

    fn req(&self, row: usize) -> Result<i64, StorageError> {
        self.opt(row).ok_or_else(|| self.invalid(row))
    }

    fn req_u32(&self, row: usize) -> Result<u32, StorageError> {
        u32::try_from(self.req(row)?).map_err(|_| self.invalid(row))
    }

    fn u32_or_zero(&self, row: usize) -> Result<u32, StorageError> {
        u32::try_from(self.or_zero(row)).map_err(|_| self.invalid(row))
    }
}

/// A string column, absent columns read as all-null.
struct StrColumn {
    name: String,
    values: Option<StringArray>,
    offset: usize,
}

impl StrColumn {
    fn load(
        batch: &RecordBatch,
        name: &str,
        required: bool,
        offset: usize,
    ) -> Result<Self, StorageError> {
        let values = match batch.column_by_name(name) {
            Some(column) => Some(cast(column, &DataType::Utf8)?.as_string::<i32>().clone()),
            None if required => return Err(StorageError::MissingColumn(name.to_string())),
            None => None,
        };
        Ok(Self {
            name: name.to_string(),
            values,
            offset,
        })
    }

    fn opt(&self, row: usize) -> Option<String> {
        self.values
            .as_ref()
            .filter(|v| v.is_valid(row))
            .map(|v| v.value(row).to_string())
    }

    fn req(&self, row: usize) -> Result<String, StorageError> {
        self.opt(row).ok_or_else(|| StorageError::InvalidValue {
            column: self.name.clone(),
            row: self.offset + row,
        })
    }
}

/// Columns of one player slot.
struct PlayerColumns {
    chara_id: IntColumn,
    name: StrColumn,
    polaris_id: StrColumn,
    power: IntColumn,
    rank: IntColumn,
    rating_before: IntColumn,
    rating_change: IntColumn,
    rounds: IntColumn,
    user_id: IntColumn,
    region_id: IntColumn,
    area_id: IntColumn,
    lang: StrColumn,
}

impl PlayerColumns {
    fn load(batch: &RecordBatch, prefix: &str, offset: usize) -> Result<Self, StorageError> {
        let int = |field: &str, required: bool| {
            IntColumn::load(batch, &format!("{}_{}", prefix, field), required, offset)
        };
        let text = |field: &str, required: bool| {
            StrColumn::load(batch, &format!("{}_{}", prefix, field), required, offset)
        };

        Ok(Self {
            chara_id: int("chara_id", true)?,
            name: text("name", false)?,
            polaris_id: text("polaris_id", true)?,
            power: int("power", false)?,
            rank: int("rank", true)?,
            rating_before: int("rating_before", false)?,
            rating_change: int("rating_change", false)?,
            rounds: int("rounds", false)?,
            user_id: int("user_id", false)?,
            region_id: int("region_id", false)?,
            area_id: int("area_id", false)?,
            lang: text("lang", false)?,
        })
    }
}

/// Decode a record batch into flat rows.
fn rows_from_batch(batch: &RecordBatch, offset: usize) -> Result<Vec<MatchRow>, StorageError> {
    let battle_at = IntColumn::load(batch, "battle_at", true, offset)?;
    let battle_id = StrColumn::load(batch, "battle_id", true, offset)?;
    let battle_type = IntColumn::load(batch, "battle_type", false, offset)?;
    let game_version = IntColumn::load(batch, "game_version", false, offset)?;
    let stage_id = IntColumn::load(batch, "stage_id", false, offset)?;
    let winner = IntColumn::load(batch, "winner", false, offset)?;
    let p1 = PlayerColumns::load(batch, "p1", offset)?;
    let p2 = PlayerColumns::load(batch, "p2", offset)?;

    (0..batch.num_rows())
        .map(|i| {
            Ok(MatchRow {
                battle_at: battle_at.req(i)?,
                battle_id: battle_id.req(i)?,
                battle_type: battle_type.or_zero(i),
                game_version: game_version.or_zero(i),
                p1_chara_id: p1.chara_id.req_u32(i)?,
                p1_name: p1.name.opt(i).unwrap_or_default(),
                p1_polaris_id: p1.polaris_id.req(i)?,
                p1_power: p1.power.or_zero(i),
                p1_rank: p1.rank.req_u32(i)?,
                p1_rating_before: p1.rating_before.or_zero(i),
                p1_rating_change: p1.rating_change.or_zero(i),
                p1_rounds: p1.rounds.u32_or_zero(i)?,
                p1_user_id: p1.user_id.or_zero(i),
                p1_region_id: p1.region_id.opt(i),
                p1_area_id: p1.area_id.opt(i),
                p1_lang: p1.lang.opt(i),
                p2_chara_id: p2.chara_id.req_u32(i)?,
                p2_name: p2.name.opt(i).unwrap_or_default(),
                p2_polaris_id: p2.polaris_id.req(i)?,
                p2_power: p2.power.or_zero(i),
                p2_rank: p2.rank.req_u32(i)?,
                p2_rating_before: p2.rating_before.or_zero(i),
                p2_rating_change: p2.rating_change.or_zero(i),
                p2_rounds: p2.rounds.u32_or_zero(i)?,
                p2_user_id: p2.user_id.or_zero(i),
                p2_region_id: p2.region_id.opt(i),
                p2_area_id: p2.area_id.opt(i),
                p2_lang: p2.lang.opt(i),
                stage_id: stage_id.or_zero(i),
                // missing, null and out-of-domain winners are void at fold time
                winner: winner.or_zero(i),
            })
        })
        .collect()
}
