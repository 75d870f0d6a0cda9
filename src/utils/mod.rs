pub mod text;
pub mod time;
pub mod hash;

// number theory used by the calculator
pub mod cpu {
    pub mod factor;
    pub mod format;
}
