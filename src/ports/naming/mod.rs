mod filename_generator;

pub use filename_generator::FilenameGenerator;
