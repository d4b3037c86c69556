use smallstr::SmallString;

pub const SMALLSTR_SIZE: usize = 20;
pub type TrackSmallStr = SmallString<[u8; SMALLSTR_SIZE]>;

/// Genomic coordinate. Signed so that flank-extended features may begin
/// upstream of position zero; the histogram pass clips them.
pub type PosType = i64;
pub type BinCountType = u32;
