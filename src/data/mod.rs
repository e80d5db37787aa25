/// Data layer: scan types, parsing, normalisation, ordering and output.
///
/// Architecture:
/// ```text
///        .mcc
///          │
///          ▼
///   ┌─────────────┐
///   │   loader     │  parse file → Vec<RawScan>
///   └─────────────┘
///          │
///          ▼
///   ┌─────────────┐
///   │   model      │  classify tags → ScanBatch
///   └─────────────┘
///          │
///          ▼
///   ┌─────────────┐
///   │  normalise   │  NONE / CRA / CM / PDD, via interpolate
///   └─────────────┘
///          │
///          ▼
///   ┌─────────────┐
///   │  ordering    │  PDD → in-plane → cross-plane
///   └─────────────┘
///          │
///          ▼
///   ┌─────────────┐
///   │   writer     │  one CSV per curve
///   └─────────────┘
/// ```

pub mod filter;
pub mod interpolate;
pub mod loader;
pub mod model;
pub mod normalise;
pub mod ordering;
pub mod writer;
