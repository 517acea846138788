mod common;
mod damage;
mod properties;
