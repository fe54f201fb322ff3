pub mod boundary;
pub mod fasta;
pub mod fs;
pub mod lookup;
pub mod table6;
