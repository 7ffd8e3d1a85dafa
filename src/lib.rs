pub mod core;
pub mod encoding;
pub mod analysis;
pub mod schema;
pub mod crypto;
pub mod index;
pub mod query;
pub mod parallel;

pub use crate::core::collection::{Collection, PutRequest};
pub use crate::core::config::Config;
pub use crate::core::error::{Error, ErrorKind, Result};
pub use crate::core::types::{FieldValue, IndexId, Record, RecordId};

/*
┌────────────────────────────────────────────────────────────────────────────────────────────┐
│                            CIPHERDEX STRUCT ARCHITECTURE                                    │
└────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── CORE LAYER ──────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                              struct Collection                                      │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ schema: Arc<CollectionSchema>     // Mappings + per-index keys               │ │    │
│  │  │ analyzer: RecordAnalyzer          // Record -> per-index terms               │ │    │
│  │  │ compiler: QueryCompiler           // Condition tree -> constraints           │ │    │
│  │  │ ciphers: Mutex<CipherCache>       // Initialised ORE ciphers by index id     │ │    │
│  │  │ factory: Arc<dyn CipherFactory>   // Injected ORE primitive                  │ │    │
│  │  │ config: Config                                                              │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│  ┌──────────────────┐  ┌──────────────────┐  ┌───────────────────────────────────────┐    │
│  │ struct Config    │  │ struct Record    │  │ enum FieldValue                       │    │
│  │ • worker_count   │  │ • id: RecordId   │  │ • Text / Number / Integer(i128)       │    │
│  │ • analyzer_cache │  │ • fields:        │  │ • Boolean / Date                      │    │
│  │ • cipher_cache   │  │   BTreeMap<..>   │  │ • Object / Array / Null               │    │
│  │ • query_limit    │  └──────────────────┘  └───────────────────────────────────────┘    │
│  └──────────────────┘                                                                      │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── ENCODING LAYER ────────────────────────────────────────┐
│                                                                                              │
│  encode_orderable(FieldValue) -> OrderableTerm { source_type, orderable: u64 }              │
│  encode_equatable(FieldValue) -> EquatableTerm { source_type, equatable: u64 }              │
│                                                                                              │
│  ┌──────────────────────┐  ┌──────────────────────┐  ┌──────────────────────────┐          │
│  │ number.rs            │  │ date.rs              │  │ hash.rs                  │          │
│  │ • f64_to_ordered     │  │ • DateResolution     │  │ • hash_term              │          │
│  │ • ordered_to_f64     │  │ • truncate           │  │   HMAC-SHA256, 64 bits   │          │
│  └──────────────────────┘  └──────────────────────┘  └──────────────────────────┘          │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── ANALYSIS LAYER ────────────────────────────────────────┐
│                                                                                              │
│  TextPipeline = tokenizer, then filters          trait TextProcessor                        │
│  ┌────────────────────┐  ┌────────────────────┐  ┌────────────────────┐                     │
│  │ StandardTokenizer  │  │ NGramTokenizer     │  │ Downcase / Upcase  │                     │
│  │ split \s , ; : !   │  │ windows of len L   │  │ case folding       │                     │
│  └────────────────────┘  └────────────────────┘  └────────────────────┘                     │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── SCHEMA LAYER ──────────────────────────────────────────┐
│                                                                                              │
│  ┌──────────────────────────────┐  ┌────────────────────────┐  ┌─────────────────────────┐  │
│  │ enum Mapping                 │  │ struct IndexMeta       │  │ SchemaDefinition (JSON) │  │
│  │ • Exact { field }            │  │ • index_name           │  │ StoredIndexSettings     │  │
│  │ • Range { field }            │  │ • index_id: IndexId    │  │ trait SettingsCipher    │  │
│  │ • Match { fields, options }  │  │ • prf_key: [u8; 16]    │  └─────────────────────────┘  │
│  │ • DynamicMatch { options }   │  │ • prp_key: [u8; 16]    │                               │
│  │ • FieldDynamicMatch { .. }   │  └────────────────────────┘                               │
│  └──────────────────────────────┘                                                            │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────── INDEX / QUERY LAYER ────────────────────────────────────────┐
│                                                                                              │
│  Record ──RecordAnalyzer──▶ AnalyzedRecord ──build_vectors──▶ Vec<IndexVector>              │
│                              { index_id -> [u64] }             { index_id, [Posting] }      │
│                                                                                              │
│  QueryBuilder ──▶ Condition ──QueryCompiler──▶ Vec<WireConstraint> ──▶ QueryRequest          │
│                   All / Exact / Range / Match / DynamicMatch / FieldDynamicMatch             │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── PARALLEL LAYER ─────────────────────────────────────────┐
│                                                                                              │
│  records ──▶ Scheduler thread ──crossbeam──▶ Worker × N ──reports──▶ Scheduler              │
│                     │                        (analyzer LRU, CipherCache)                     │
│                     ▼                                                                        │
│              AsyncQueue<JobOutcome> ──next().await──▶ consumer                               │
└──────────────────────────────────────────────────────────────────────────────────────────────┘
*/
