mod fixtures;
mod positions;
mod providers;
mod returns;
