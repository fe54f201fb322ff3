use derive_more::Display;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The thirteen mutation-flag labels of §4.4, plus the two terminal-extension
/// variants counted among them for whitelist/ledger purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, JsonSchema)]
pub enum FlagKind {
  #[display("5'CTS-del")]
  Cts5Del,
  #[display("3'CTS-del")]
  Cts3Del,
  #[display("5'NCR-del")]
  Ncr5Del,
  #[display("3'NCR-del")]
  Ncr3Del,
  #[display("CDS-3Xdel")]
  Cds3XDel,
  #[display("CDS-del")]
  CdsDel,
  #[display("5'CTS-ins")]
  Cts5Ins,
  #[display("3'CTS-ins")]
  Cts3Ins,
  #[display("5'NCR-ins")]
  Ncr5Ins,
  #[display("3'NCR-ins")]
  Ncr3Ins,
  #[display("CDS-3Xins")]
  Cds3XIns,
  #[display("CDS-ins")]
  CdsIns,
  #[display("5'NCR-ext")]
  Ncr5Ext,
  #[display("3'NCR-ext")]
  Ncr3Ext,
  #[display("5'CTS-mut")]
  Cts5Mut,
  #[display("3'CTS-mut")]
  Cts3Mut,
}

impl FlagKind {
  /// Whether this kind is subject to whitelist suppression per §4.6.
  pub fn is_whitelistable(self) -> bool {
    matches!(self, Self::Ncr5Del | Self::Ncr3Del | Self::CdsDel | Self::Cds3XDel)
  }

  pub fn is_cds(self) -> bool {
    matches!(self, Self::Cds3XDel | Self::CdsDel | Self::Cds3XIns | Self::CdsIns)
  }

  pub fn is_ncr_or_cts(self) -> bool {
    matches!(
      self,
      Self::Cts5Del
        | Self::Cts3Del
        | Self::Ncr5Del
        | Self::Ncr3Del
        | Self::Cts5Ins
        | Self::Cts3Ins
        | Self::Ncr5Ins
        | Self::Ncr3Ins
        | Self::Ncr5Ext
        | Self::Ncr3Ext
        | Self::Cts5Mut
        | Self::Cts3Mut
    )
  }
}

/// One emitted mutation-flag record, per §3's "Flag record" definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Flag {
  pub kind: FlagKind,
  /// Either `"n"` or `"n..m"`, in canonical profile coordinates (or the
  /// `"0.."`/`"..END"` terminal-extension spellings).
  pub profile_pos: String,
  /// Either `"n"` or `"n..m"`, in canonical query coordinates.
  pub query_pos: String,
  /// `"del"` for deletions, else the uppercase base string.
  pub variant: String,
  pub length: usize,
}

/// Ambiguity-screen flags of §4.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, JsonSchema)]
pub enum AmbiguityFlag {
  #[display("Excess-N")]
  ExcessN,
  #[display("Excess-Ambig")]
  ExcessAmbig,
  #[display("Excess-Dist")]
  ExcessDist,
}

/// Per-query summary flag, §4.5 step 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize, JsonSchema)]
pub enum SummaryFlag {
  #[display("Ambig-Seq")]
  AmbigSeq,
  #[display("Flag-CDS")]
  FlagCds,
  #[display("Flag-NCR")]
  FlagNcr,
  #[display("Pass")]
  Pass,
}

/// The "return a table or a sentinel string" pattern replaced by a tagged variant,
/// per the design notes: consumers match on this instead of parsing sentinel strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FlagReport {
  Pass,
  Unknown,
  Flags(Vec<Flag>),
}

impl FlagReport {
  pub fn is_unknown(&self) -> bool {
    matches!(self, Self::Unknown)
  }

  pub fn flags(&self) -> &[Flag] {
    match self {
      Self::Flags(flags) => flags,
      _ => &[],
    }
  }
}
