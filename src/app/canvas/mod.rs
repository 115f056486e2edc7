mod interaction;
mod legend;
mod view;
