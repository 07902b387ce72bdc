mod machine;
mod util;
