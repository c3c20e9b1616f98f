pub const DELIMITER: char = '\t';
pub const GZ_FILE_EXTENSION: &str = "gz";

/// Canonical chromosome order of the S288c capture genome.
pub const DEFAULT_CHROMOSOME_ORDER: [&str; 19] = [
    "chr1",
    "chr2",
    "chr3",
    "chr4",
    "chr5",
    "chr6",
    "chr7",
    "chr8",
    "chr9",
    "chr10",
    "chr11",
    "chr12",
    "chr13",
    "chr14",
    "chr15",
    "chr16",
    "2_micron",
    "mitochondrion",
    "chr_artificial",
];

pub const ARTIFICIAL_CHROMOSOME: &str = "chr_artificial";
pub const DOUBLE_STRANDED_TYPE: &str = "ds";
pub const DEFAULT_CIS_RANGE: u64 = 50_000;

// fragment list columns (hicstuff)
pub const FRAGMENT_CHR_COL_NAME: &str = "chrom";
pub const FRAGMENT_START_COL_NAME: &str = "start_pos";
pub const FRAGMENT_END_COL_NAME: &str = "end_pos";
pub const FRAGMENT_SIZE_COL_NAME: &str = "size";
pub const FRAGMENT_GC_COL_NAME: &str = "gc_content";

// probe list columns
pub const PROBE_NAME_COL_NAME: &str = "name";
pub const PROBE_TYPE_COL_NAME: &str = "type";
pub const PROBE_CHR_COL_NAME: &str = "chr";
pub const PROBE_START_COL_NAME: &str = "start";
pub const PROBE_END_COL_NAME: &str = "end";
pub const PROBE_SEQUENCE_COL_NAME: &str = "sequence";

// profile key columns
pub const CHR_COL_NAME: &str = "chr";
pub const START_COL_NAME: &str = "start";
pub const SIZES_COL_NAME: &str = "sizes";
pub const CHR_BINS_COL_NAME: &str = "chr_bins";

// statistics tables
pub const PROBE_COL_NAME: &str = "probe";
pub const FRAGMENT_COL_NAME: &str = "fragment";
pub const TYPE_COL_NAME: &str = "type";
pub const CAPTURE_EFFICIENCY_COL_NAME: &str = "capture_efficiency";
pub const RELATIVE_EFFICIENCY_PREFIX: &str = "capture_efficiency_vs_";

// rebinning
/// Size of a zero-filled bin grid (bins x probes) above which rebinning warns.
pub const LARGE_GRID_CELLS: u64 = 200_000_000;
