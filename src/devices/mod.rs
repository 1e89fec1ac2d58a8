/*!
 * Devices Module
 * Console and power primitives
 */

pub mod console;
pub mod power;

pub use console::{BufferConsole, Console, StdConsole};
pub use power::{PowerControl, SoftPower};
