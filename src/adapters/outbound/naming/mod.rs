mod random_filename;

pub use random_filename::RandomFilenameGenerator;
