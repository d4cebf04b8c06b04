//! Embedding schema and vector helpers.
//!
//! One wide table holds a nullable vector column per supported dimension;
//! exactly one column is populated per row, matching the embedding model
//! configured for the owning agent. Sparse columns are a deliberate
//! trade-off for a single schema across models.

use crate::error::{AdapterError, Result};

/// Supported embedding dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmbeddingDimension {
    D384,
    D512,
    D768,
    D1024,
    D1536,
    D3072,
}

impl EmbeddingDimension {
    /// All supported dimensions, in column order.
    pub const ALL: [EmbeddingDimension; 6] = [
        EmbeddingDimension::D384,
        EmbeddingDimension::D512,
        EmbeddingDimension::D768,
        EmbeddingDimension::D1024,
        EmbeddingDimension::D1536,
        EmbeddingDimension::D3072,
    ];

    /// Vector length.
    pub fn size(self) -> usize {
        match self {
            EmbeddingDimension::D384 => 384,
            EmbeddingDimension::D512 => 512,
            EmbeddingDimension::D768 => 768,
            EmbeddingDimension::D1024 => 1024,
            EmbeddingDimension::D1536 => 1536,
            EmbeddingDimension::D3072 => 3072,
        }
    }

    /// Column holding vectors of this dimension.
    pub fn column(self) -> &'static str {
        match self {
            EmbeddingDimension::D384 => "dim_384",
            EmbeddingDimension::D512 => "dim_512",
            EmbeddingDimension::D768 => "dim_768",
            EmbeddingDimension::D1024 => "dim_1024",
            EmbeddingDimension::D1536 => "dim_1536",
            EmbeddingDimension::D3072 => "dim_3072",
        }
    }

    /// Resolve a vector length to its dimension, or a validation error.
    pub fn from_size(size: usize) -> Result<EmbeddingDimension> {
        Self::ALL
            .into_iter()
            .find(|d| d.size() == size)
            .ok_or_else(|| {
                AdapterError::validation(format!(
                    "unsupported embedding dimension {size} (supported: 384, 512, 768, 1024, 1536, 3072)"
                ))
            })
    }
}

impl Default for EmbeddingDimension {
    fn default() -> Self {
        EmbeddingDimension::D384
    }
}

/// Postgres table: one nullable pgvector column per dimension, cascade
/// delete from the owning memory.
pub const PG_CREATE_EMBEDDINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS embeddings (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    memory_id UUID REFERENCES memories(id) ON DELETE CASCADE NOT NULL UNIQUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    dim_384 vector(384),
    dim_512 vector(512),
    dim_768 vector(768),
    dim_1024 vector(1024),
    dim_1536 vector(1536),
    dim_3072 vector(3072)
)
"#;

pub const PG_CREATE_EMBEDDINGS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_embeddings_memory_id ON embeddings (memory_id);
"#;

/// SQLite table: a single binary blob plus the dimension tag; distance is
/// computed in process.
pub const SQLITE_CREATE_EMBEDDINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS embeddings (
    id TEXT PRIMARY KEY,
    memory_id TEXT NOT NULL UNIQUE REFERENCES memories(id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    dimension INTEGER NOT NULL,
    embedding BLOB NOT NULL
)
"#;

pub const SQLITE_CREATE_EMBEDDINGS_INDEXES: &str = r#"
CREATE INDEX IF NOT EXISTS idx_embeddings_memory_id ON embeddings (memory_id);
"#;

/// Similarity-index migration statement for one Postgres vector column.
///
/// pgvector caps indexable vectors at 2000 dimensions, so the 3072 column
/// is indexed through a halfvec expression instead.
pub fn pg_vector_index_sql(dimension: EmbeddingDimension) -> String {
    let col = dimension.column();
    if dimension.size() > 2000 {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_embeddings_{col} ON embeddings \
             USING hnsw (({col}::halfvec({size})) halfvec_cosine_ops)",
            col = col,
            size = dimension.size()
        )
    } else {
        format!(
            "CREATE INDEX IF NOT EXISTS idx_embeddings_{col} ON embeddings \
             USING hnsw ({col} vector_cosine_ops)",
            col = col
        )
    }
}

/// Encode a vector as little-endian f32 bytes for SQLite blob storage.
pub fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for v in vector {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a SQLite blob back into a vector.
pub fn blob_to_vector(blob: &[u8]) -> Result<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(AdapterError::Database(format!(
            "embedding blob of {} bytes is not a whole number of f32s",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Encode a vector in the pgvector text representation `[0.1,0.2,...]`,
/// bound as text and cast with `::vector` in SQL.
pub fn vector_to_text(vector: &[f32]) -> String {
    let mut out = String::with_capacity(vector.len() * 8 + 2);
    out.push('[');
    for (i, v) in vector.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&v.to_string());
    }
    out.push(']');
    out
}

/// Parse the pgvector text representation `[0.1,0.2,...]`.
pub fn parse_vector_text(text: &str) -> Result<Vec<f32>> {
    let inner = text
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| AdapterError::Database(format!("malformed vector literal: {text}")))?;
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|e| AdapterError::Database(format!("malformed vector component: {e}")))
        })
        .collect()
}

/// Cosine distance between two vectors: `1 - cos(a, b)`.
///
/// Zero-length or zero-norm inputs are treated as maximally distant.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 1.0;
    }
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimension_lookup_by_size() {
        assert_eq!(
            EmbeddingDimension::from_size(384).unwrap(),
            EmbeddingDimension::D384
        );
        assert_eq!(
            EmbeddingDimension::from_size(3072).unwrap(),
            EmbeddingDimension::D3072
        );
        assert!(EmbeddingDimension::from_size(500).is_err());
    }

    #[test]
    fn dimension_columns_are_distinct() {
        let mut cols: Vec<_> = EmbeddingDimension::ALL.iter().map(|d| d.column()).collect();
        cols.dedup();
        assert_eq!(cols.len(), 6);
    }

    #[test]
    fn blob_round_trip() {
        let v = vec![0.25_f32, -1.5, 3.125, 0.0];
        assert_eq!(blob_to_vector(&vector_to_blob(&v)).unwrap(), v);
    }

    #[test]
    fn truncated_blob_is_rejected() {
        assert!(blob_to_vector(&[0, 1, 2]).is_err());
    }

    #[test]
    fn vector_text_round_trip() {
        let v = vec![1.0_f32, 0.5, -2.0];
        assert_eq!(vector_to_text(&v), "[1,0.5,-2]");
        assert_eq!(parse_vector_text(&vector_to_text(&v)).unwrap(), v);
    }

    #[test]
    fn vector_text_parses() {
        assert_eq!(
            parse_vector_text("[1,0.5,-2]").unwrap(),
            vec![1.0, 0.5, -2.0]
        );
        assert!(parse_vector_text("1,2,3").is_err());
    }

    #[test]
    fn cosine_distance_basics() {
        let a = [1.0_f32, 0.0];
        let b = [1.0_f32, 0.0];
        let c = [0.0_f32, 1.0];
        let d = [-1.0_f32, 0.0];

        assert!(cosine_distance(&a, &b).abs() < 1e-9);
        assert!((cosine_distance(&a, &c) - 1.0).abs() < 1e-9);
        assert!((cosine_distance(&a, &d) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn zero_vectors_are_maximally_distant() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_distance(&[], &[]), 1.0);
    }

    #[test]
    fn large_dimension_index_uses_halfvec() {
        let sql = pg_vector_index_sql(EmbeddingDimension::D3072);
        assert!(sql.contains("halfvec"));
        let sql = pg_vector_index_sql(EmbeddingDimension::D384);
        assert!(sql.contains("vector_cosine_ops"));
    }
}
